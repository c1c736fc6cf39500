use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use kisan_server::{
    assistant::{Assistant, AssistantError, FALLBACK_REPLY},
    build_router,
    config::Settings,
    db::{repositories::PostRepository, Database},
    state::AppState,
};
use kisan_types::{CommunityPost, StoredImage, DISEASE_TABLE};

const BOUNDARY: &str = "kisan-test-boundary";

/// Answers with a canned reply, or fails like an unreachable backend
struct StubAssistant {
    reply: Option<&'static str>,
}

#[async_trait]
impl Assistant for StubAssistant {
    async fn chat(&self, message: &str) -> Result<String, AssistantError> {
        match self.reply {
            Some(reply) => Ok(format!("{reply} ({message})")),
            None => Err(AssistantError::EmptyReply),
        }
    }

    async fn analyze_image(&self, mime_type: &str, image: &[u8]) -> Result<String, AssistantError> {
        match self.reply {
            Some(reply) => Ok(format!("{reply} [{mime_type}, {} bytes]", image.len())),
            None => Err(AssistantError::MissingApiKey),
        }
    }
}

fn setup_with(reply: Option<&'static str>) -> (Router, AppState) {
    let settings = Settings::for_tests();
    let db = Database::in_memory().expect("Failed to create test database");
    db.initialize().expect("Failed to initialize database");
    db.seed_reference_data().expect("Failed to seed reference data");

    let state = AppState::new(
        db,
        settings.session.ttl_days,
        Arc::new(StubAssistant { reply }),
        &settings.uploads.dir,
    );
    (build_router(state.clone()), state)
}

fn setup() -> (Router, AppState) {
    setup_with(Some("Spray neem oil"))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("Request failed")
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn post_multipart(uri: &str, cookie: &str, parts: &[Part]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// Log in by phone and return the `name=value` cookie pair
async fn login(app: &Router, phone: &str) -> String {
    let response = send(app, post_form("/login", None, &format!("phone={phone}"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Login should set a session cookie");
    set_cookie
        .split(';')
        .next()
        .expect("Cookie header is empty")
        .to_string()
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let (app, _) = setup();

    for uri in ["/dashboard", "/scan", "/community", "/market", "/schemes", "/prices", "/assistant"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }

    let forged = send(&app, get("/dashboard", Some("kisan_session=not-a-token"))).await;
    assert_eq!(location(&forged), "/login");
}

#[tokio::test]
async fn test_health_and_login_page_are_public() {
    let (app, _) = setup();

    let health = send(&app, get("/health", None)).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_text(health).await, "OK");

    let login_page = send(&app, get("/", None)).await;
    assert_eq!(login_page.status(), StatusCode::OK);
    assert!(body_text(login_page).await.contains("name=\"phone\""));

    let css = send(&app, get("/static/style.css", None)).await;
    assert!(css.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
}

#[tokio::test]
async fn test_phone_login_reuses_account() {
    let (app, state) = setup();

    let first = login(&app, "9876543210").await;
    let second = login(&app, "9876543210").await;
    assert_ne!(first, second, "Each login starts a fresh session");

    let users: i64 = state
        .db
        .connection()
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM users WHERE phone = ?",
            ["9876543210"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(users, 1);

    let dashboard = send(&app, get("/dashboard", Some(&first))).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(body_text(dashboard).await.contains("Farmer 3210"));
}

#[tokio::test]
async fn test_logged_in_user_skips_login_page() {
    let (app, _) = setup();
    let cookie = login(&app, "9000000001").await;

    let response = send(&app, get("/login", Some(&cookie))).await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_empty_phone_shows_error() {
    let (app, _) = setup();

    let response = send(&app, post_form("/login", None, "phone=+")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please enter your mobile number"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _) = setup();
    let cookie = login(&app, "9000000002").await;

    let response = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(location(&response), "/login");

    let after = send(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(location(&after), "/login");
}

#[tokio::test]
async fn test_register_then_password_is_required() {
    let (app, _) = setup();

    let registered = send(
        &app,
        post_form("/register", None, "name=Ramesh&phone=9111111111&password=khet123"),
    )
    .await;
    assert_eq!(location(&registered), "/dashboard");

    let duplicate = send(
        &app,
        post_form("/register", None, "name=Suresh&phone=9111111111&password=other"),
    )
    .await;
    assert!(body_text(duplicate).await.contains("already registered"));

    let wrong = send(&app, post_form("/login", None, "phone=9111111111&password=nope")).await;
    assert!(body_text(wrong).await.contains("Invalid phone number or password"));

    let right = send(
        &app,
        post_form("/login", None, "phone=9111111111&password=khet123"),
    )
    .await;
    assert_eq!(location(&right), "/dashboard");
}

#[tokio::test]
async fn test_community_feed_is_newest_first() {
    let (app, _) = setup();
    let cookie = login(&app, "9222222222").await;

    for content in ["Older question about wheat", "Newer question about rice"] {
        let response = send(
            &app,
            post_multipart(
                "/community",
                &cookie,
                &[Part::Text("content", content), Part::Text("tag", "Wheat")],
            ),
        )
        .await;
        assert_eq!(location(&response), "/community");
    }

    let feed = body_text(send(&app, get("/community", Some(&cookie))).await).await;
    let older = feed.find("Older question about wheat").expect("older post missing");
    let newer = feed.find("Newer question about rice").expect("newer post missing");
    assert!(newer < older);

    let filtered = body_text(send(&app, get("/community?tag=Rice", Some(&cookie))).await).await;
    assert!(!filtered.contains("Older question about wheat"));
}

#[tokio::test]
async fn test_post_image_is_served() {
    let (app, state) = setup();
    let cookie = login(&app, "9222222223").await;

    send(
        &app,
        post_multipart(
            "/community",
            &cookie,
            &[
                Part::Text("content", "What is wrong with this leaf?"),
                Part::File("image", "leaf.png", "image/png", b"\x89PNG fake"),
            ],
        ),
    )
    .await;

    let post = PostRepository::new(state.db.pool.clone())
        .list(None)
        .unwrap()
        .remove(0);
    assert!(post.has_image);
    assert_eq!(post.tag, "General");

    let image = send(&app, get(&format!("/community/{}/image", post.id), Some(&cookie))).await;
    assert_eq!(image.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_liking_twice_counts_once() {
    let (app, state) = setup();
    let cookie = login(&app, "9333333333").await;

    send(
        &app,
        post_multipart("/community", &cookie, &[Part::Text("content", "Like me")]),
    )
    .await;
    let posts = PostRepository::new(state.db.pool.clone());
    let post_id = posts.list(None).unwrap()[0].id;

    for _ in 0..2 {
        let response = send(
            &app,
            post_form(&format!("/community/{post_id}/like"), Some(&cookie), ""),
        )
        .await;
        assert_eq!(location(&response), "/community");
    }
    assert_eq!(posts.get_by_id(&post_id).unwrap().unwrap().like_count, 1);

    let other = login(&app, "9333333334").await;
    send(&app, post_form(&format!("/community/{post_id}/like"), Some(&other), "")).await;
    assert_eq!(posts.get_by_id(&post_id).unwrap().unwrap().like_count, 2);
}

#[tokio::test]
async fn test_comment_on_missing_post_is_not_found() {
    let (app, _) = setup();
    let cookie = login(&app, "9333333335").await;

    let missing = uuid::Uuid::new_v4();
    let response = send(
        &app,
        post_form(&format!("/community/{missing}/comment"), Some(&cookie), "content=hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bad_id = send(
        &app,
        post_form("/community/not-a-uuid/like", Some(&cookie), ""),
    )
    .await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comments_show_in_feed() {
    let (app, state) = setup();
    let cookie = login(&app, "9333333336").await;

    send(
        &app,
        post_multipart("/community", &cookie, &[Part::Text("content", "Yellow leaves?")]),
    )
    .await;
    let post_id = PostRepository::new(state.db.pool.clone()).list(None).unwrap()[0].id;

    let response = send(
        &app,
        post_form(
            &format!("/community/{post_id}/comment"),
            Some(&cookie),
            "content=Try+adding+urea",
        ),
    )
    .await;
    assert_eq!(location(&response), "/community");

    let feed = body_text(send(&app, get("/community", Some(&cookie))).await).await;
    assert!(feed.contains("Try adding urea"));
    assert!(feed.contains("1 comments"));
}

#[tokio::test]
async fn test_scan_returns_table_entry() {
    let (app, _) = setup();
    let cookie = login(&app, "9444444444").await;

    let response = send(
        &app,
        post_multipart(
            "/scan",
            &cookie,
            &[Part::File("file", "my leaf.jpg", "image/jpeg", b"not really a jpeg")],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;

    assert!(DISEASE_TABLE.iter().any(|d| page.contains(d.name)));

    let marker = "<strong>Confidence:</strong> ";
    let start = page.find(marker).expect("confidence missing") + marker.len();
    let end = start + page[start..].find('%').expect("percent sign missing");
    let confidence: u8 = page[start..end].parse().unwrap();
    assert!((85..=99).contains(&confidence));
    assert!(page.contains("-my_leaf.jpg"));
}

#[tokio::test]
async fn test_scan_without_file_goes_back() {
    let (app, _) = setup();
    let cookie = login(&app, "9444444445").await;

    let response = send(&app, post_multipart("/analyze", &cookie, &[])).await;
    assert_eq!(location(&response), "/scan");
}

#[tokio::test]
async fn test_market_listing_defaults_contact() {
    let (app, _) = setup();
    let cookie = login(&app, "9555555555").await;

    let response = send(
        &app,
        post_multipart(
            "/market",
            &cookie,
            &[
                Part::Text("name", "Basmati Rice"),
                Part::Text("price", "3500 / quintal"),
                Part::Text("location", "Karnal"),
            ],
        ),
    )
    .await;
    assert_eq!(location(&response), "/market");

    let page = body_text(send(&app, get("/market", Some(&cookie))).await).await;
    assert!(page.contains("Basmati Rice"));
    assert!(page.contains("tel:9555555555"));

    let incomplete = send(
        &app,
        post_multipart("/market", &cookie, &[Part::Text("name", "No price")]),
    )
    .await;
    assert_eq!(location(&incomplete), "/market");
    let page = body_text(send(&app, get("/market", Some(&cookie))).await).await;
    assert!(!page.contains("No price"));
}

#[tokio::test]
async fn test_schemes_filter_by_kind() {
    let (app, _) = setup();
    let cookie = login(&app, "9666666666").await;

    let all = body_text(send(&app, get("/schemes", Some(&cookie))).await).await;
    let government = body_text(send(&app, get("/schemes?kind=government", Some(&cookie))).await).await;
    let private = body_text(send(&app, get("/schemes?kind=private", Some(&cookie))).await).await;

    assert!(all.contains("PM-KISAN"));
    assert!(government.contains("PM-KISAN"));
    assert!(!private.contains("PM-KISAN"));
}

#[tokio::test]
async fn test_prices_for_unknown_market_are_empty() {
    let (app, _) = setup();
    let cookie = login(&app, "9777777777").await;

    let known = body_text(send(&app, get("/prices?market=Azadpur", Some(&cookie))).await).await;
    assert!(known.contains("Tomato"));

    let unknown = body_text(send(&app, get("/prices?market=Atlantis", Some(&cookie))).await).await;
    assert!(unknown.contains("No prices available for this market."));
    assert!(!unknown.contains("<tbody>"));
}

#[tokio::test]
async fn test_assistant_keeps_history() {
    let (app, _) = setup();
    let cookie = login(&app, "9888888888").await;

    let response = send(
        &app,
        post_form("/assistant", Some(&cookie), "message=When+to+sow+wheat"),
    )
    .await;
    assert_eq!(location(&response), "/assistant");

    let page = body_text(send(&app, get("/assistant", Some(&cookie))).await).await;
    assert!(page.contains("When to sow wheat"));
    assert!(page.contains("Spray neem oil (When to sow wheat)"));

    let other = login(&app, "9888888889").await;
    let other_page = body_text(send(&app, get("/assistant", Some(&other))).await).await;
    assert!(!other_page.contains("When to sow wheat"));
}

#[tokio::test]
async fn test_assistant_photo_analysis() {
    let (app, _) = setup();
    let cookie = login(&app, "9888888890").await;

    send(
        &app,
        post_multipart(
            "/assistant/analyze",
            &cookie,
            &[Part::File("image", "crop.jpg", "image/jpeg", b"1234")],
        ),
    )
    .await;

    let page = body_text(send(&app, get("/assistant", Some(&cookie))).await).await;
    assert!(page.contains("Spray neem oil [image/jpeg, 4 bytes]"));
}

#[tokio::test]
async fn test_assistant_failure_uses_fallback() {
    let (app, _) = setup_with(None);
    let cookie = login(&app, "9999999999").await;

    send(
        &app,
        post_form("/assistant", Some(&cookie), "message=Is+it+going+to+rain"),
    )
    .await;

    let page = body_text(send(&app, get("/assistant", Some(&cookie))).await).await;
    assert!(page.contains(FALLBACK_REPLY));
}

#[tokio::test]
async fn test_markup_upload_is_not_stored_as_image() {
    let (app, state) = setup();
    let cookie = login(&app, "9222222224").await;

    send(
        &app,
        post_multipart(
            "/community",
            &cookie,
            &[
                Part::Text("content", "Look at this"),
                Part::File(
                    "image",
                    "x.html",
                    "text/html",
                    b"<script>alert(document.domain)</script>",
                ),
            ],
        ),
    )
    .await;

    let post = PostRepository::new(state.db.pool.clone())
        .list(None)
        .unwrap()
        .remove(0);
    assert_eq!(post.content, "Look at this");
    assert!(!post.has_image);

    let image = send(&app, get(&format!("/community/{}/image", post.id), Some(&cookie))).await;
    assert_eq!(image.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stored_markup_is_served_as_download() {
    let (app, state) = setup();
    let cookie = login(&app, "9222222225").await;
    let author = state
        .session_manager
        .validate_session(cookie.trim_start_matches("kisan_session="))
        .unwrap();

    let post = CommunityPost {
        id: uuid::Uuid::new_v4(),
        author_id: author,
        author_name: String::new(),
        content: "Imported before upload checks".to_string(),
        tag: "General".to_string(),
        created_at: chrono::Utc::now(),
        has_image: true,
        like_count: 0,
        comment_count: 0,
        comments: Vec::new(),
    };
    let stored = StoredImage {
        content_type: "text/html".to_string(),
        bytes: b"<script>alert(document.domain)</script>".to_vec(),
    };
    PostRepository::new(state.db.pool.clone())
        .create(&post, Some(&stored))
        .unwrap();

    let image = send(&app, get(&format!("/community/{}/image", post.id), Some(&cookie))).await;
    assert_eq!(image.status(), StatusCode::OK);
    assert_eq!(image.headers()[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(image.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}

#[tokio::test]
async fn test_scan_rejects_markup_upload() {
    let (app, _) = setup();
    let cookie = login(&app, "9444444446").await;

    let response = send(
        &app,
        post_multipart(
            "/scan",
            &cookie,
            &[Part::File("file", "x.html", "text/html", b"<script>alert(1)</script>")],
        ),
    )
    .await;
    assert_eq!(location(&response), "/scan");
}

#[tokio::test]
async fn test_scan_upload_is_served_without_sniffing() {
    let (app, _) = setup();
    let cookie = login(&app, "9444444447").await;

    let page = body_text(
        send(
            &app,
            post_multipart(
                "/scan",
                &cookie,
                &[Part::File("file", "x.html", "image/png", b"<script>alert(1)</script>")],
            ),
        )
        .await,
    )
    .await;

    let marker = "src=\"/static/uploads/";
    let start = page.find(marker).expect("upload link missing") + marker.len();
    let end = start + page[start..].find('"').expect("unterminated src");
    let stored = &page[start..end];
    assert!(stored.ends_with("-x.html.bin"));

    let served = send(&app, get(&format!("/static/uploads/{stored}"), Some(&cookie))).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let content_type = served.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(!content_type.contains("html"), "{content_type}");
}

#[tokio::test]
async fn test_product_image_carries_nosniff() {
    let (app, _) = setup();
    let cookie = login(&app, "9555555556").await;

    send(
        &app,
        post_multipart(
            "/market",
            &cookie,
            &[
                Part::Text("name", "Tomatoes"),
                Part::Text("price", "20 / kg"),
                Part::File("image", "t.png", "image/png", b"\x89PNG fake"),
            ],
        ),
    )
    .await;

    let page = body_text(send(&app, get("/market", Some(&cookie))).await).await;
    let marker = "src=\"/market/";
    let start = page.find(marker).expect("product image missing") + marker.len();
    let end = start + page[start..].find('"').expect("unterminated src");

    let image = send(&app, get(&format!("/market/{}", &page[start..end]), Some(&cookie))).await;
    assert_eq!(image.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(image.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}
