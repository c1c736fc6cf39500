//! Server-rendered pages.
//!
//! Every value that came from a user or the database goes through
//! [`escape`] before it is interpolated.

use axum::http::StatusCode;
use uuid::Uuid;

use kisan_types::{
    ChatMessage, ChatRole, CommunityPost, PriceQuote, Product, RiskLevel, Scheme, SchemeKind,
    User, CROP_TAGS,
};

use crate::diagnosis::Diagnosis;

pub const STYLESHEET: &str = r#":root { --primary: #008f51; --light-bg: #f4f7f6; }
body { font-family: sans-serif; background: var(--light-bg); padding-bottom: 70px; margin: 0; }
.top-nav { background: var(--primary); color: white; padding: 15px; border-radius: 0 0 20px 20px; }
.bottom-nav { position: fixed; bottom: 0; width: 100%; background: white; display: flex; justify-content: space-around; padding: 10px 0; border-top: 1px solid #ddd; }
.nav-item { text-align: center; color: #888; text-decoration: none; font-size: 0.8rem; }
.nav-item i { display: block; font-size: 1.4rem; margin-bottom: 2px; }
.nav-item.active { color: var(--primary); font-weight: bold; }
.scan-btn { background: var(--primary); color: white; width: 60px; height: 60px; border-radius: 50%; display: flex; align-items: center; justify-content: center; margin-top: -30px; border: 4px solid white; }
.card { background: white; border-radius: 15px; padding: 20px; margin: 15px; box-shadow: 0 2px 5px rgba(0,0,0,0.05); }
.tiles { display: grid; grid-template-columns: 1fr 1fr; }
.tiles .card { margin: 8px; text-align: center; color: inherit; text-decoration: none; }
.btn { background: var(--primary); color: white; border: none; padding: 12px; border-radius: 8px; width: 100%; font-size: 1rem; cursor: pointer; text-decoration: none; display: inline-block; text-align: center; }
.btn.small { width: auto; padding: 6px 12px; font-size: 0.85rem; }
.btn.liked { background: #c0392b; }
.error { background: #fdecea; color: #b71c1c; padding: 10px; border-radius: 8px; margin: 10px 0; }
.muted { color: #999; font-size: 0.8rem; }
.chip { display: inline-block; padding: 4px 10px; margin: 2px; border-radius: 12px; background: #e0f2e9; color: var(--primary); text-decoration: none; font-size: 0.85rem; }
.chip.active { background: var(--primary); color: white; }
.bubble { padding: 10px; border-radius: 12px; margin: 6px 0; white-space: pre-wrap; }
.bubble.user { background: #e0f2e9; margin-left: 40px; }
.bubble.assistant { background: white; margin-right: 40px; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; border-bottom: 1px solid #eee; text-align: left; }
img.photo { max-width: 100%; border-radius: 10px; margin-top: 8px; }
input, select, textarea { width: 90%; padding: 10px; margin-bottom: 10px; border: 1px solid #ccc; border-radius: 5px; }
"#;

/// Bottom navigation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Community,
    Scan,
    Market,
    Assistant,
}

/// Escape text for HTML element and attribute context
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn bottom_nav(active: Nav) -> String {
    let item = |nav: Nav, href: &str, icon: &str, label: &str| {
        let class = if nav == active { "nav-item active" } else { "nav-item" };
        format!(r#"<a href="{href}" class="{class}"><i class="fas {icon}"></i> {label}</a>"#)
    };

    format!(
        r#"<div class="bottom-nav">{}{}<a href="/scan" class="scan-btn"><i class="fas fa-camera"></i></a>{}{}<a href="/logout" class="nav-item"><i class="fas fa-user"></i> Exit</a></div>"#,
        item(Nav::Home, "/dashboard", "fa-home", "Home"),
        item(Nav::Community, "/community", "fa-users", "Comm"),
        item(Nav::Market, "/market", "fa-store", "Market"),
        item(Nav::Assistant, "/assistant", "fa-robot", "Mitra"),
    )
}

/// Wrap a page body in the shared document shell.
/// The bottom navigation is only shown to logged-in users.
pub fn layout(title: &str, nav: Option<Nav>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">
    <title>{title} | Kisan Doctor</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css">
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
{nav}
</body>
</html>
"#,
        title = escape(title),
        nav = nav.map(bottom_nav).unwrap_or_default(),
    )
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|msg| format!(r#"<div class="error">{}</div>"#, escape(msg)))
        .unwrap_or_default()
}

pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        r#"<div style="text-align:center; margin-top:100px;">
    <i class="fas fa-tractor fa-4x" style="color:var(--primary);"></i>
    <h2 style="color:var(--primary);">Kisan Doctor</h2>
    <form method="POST" action="/login" style="margin: 30px;">
        {error}
        <input type="tel" name="phone" placeholder="Mobile Number" required>
        <input type="password" name="password" placeholder="Password (if you registered one)">
        <button type="submit" class="btn">Login</button>
    </form>
    <a href="/register">Create an account with a password</a>
</div>"#,
        error = error_banner(error),
    );
    layout("Login", None, &body)
}

pub fn register_page(error: Option<&str>) -> String {
    let body = format!(
        r#"<div style="text-align:center; margin-top:60px;">
    <h2 style="color:var(--primary);">Join Krishi Mitra</h2>
    <form method="POST" action="/register" style="margin: 30px;">
        {error}
        <input type="text" name="name" placeholder="Your Name" required>
        <input type="tel" name="phone" placeholder="Mobile Number" required>
        <input type="password" name="password" placeholder="Password" required>
        <button type="submit" class="btn">Register</button>
    </form>
    <a href="/login">Already registered? Login</a>
</div>"#,
        error = error_banner(error),
    );
    layout("Register", None, &body)
}

pub fn dashboard_page(user: &User) -> String {
    let tile = |href: &str, icon: &str, color: &str, title: &str, text: &str| {
        format!(
            r#"<a class="card" href="{href}"><i class="fas {icon} fa-2x" style="color:{color};"></i><h3>{title}</h3><p>{text}</p></a>"#
        )
    };

    let body = format!(
        r#"<div class="top-nav">
    <h3>Namaste, {name}</h3>
    <p>Your crops, our care.</p>
</div>
<div class="card" id="weather-box" style="background: linear-gradient(135deg, #008f51, #4caf50); color: white;">
    <h1 id="temp">--°C</h1>
    <p id="loc">Loading Weather...</p>
</div>
<div class="tiles">
{scan}{community}{market}{schemes}{prices}{assistant}
</div>
<script>
    if (navigator.geolocation) {{
        navigator.geolocation.getCurrentPosition(async p => {{
            const res = await fetch(`https://api.open-meteo.com/v1/forecast?latitude=${{p.coords.latitude}}&longitude=${{p.coords.longitude}}&current_weather=true`);
            const data = await res.json();
            document.getElementById('temp').innerText = data.current_weather.temperature + "°C";
            document.getElementById('loc').innerText = "Local Weather";
        }});
    }}
</script>"#,
        name = escape(&user.name),
        scan = tile("/scan", "fa-leaf", "var(--primary)", "Heal Your Crop", "Take a photo to detect diseases."),
        community = tile("/community", "fa-users", "orange", "Community", "Ask other farmers."),
        market = tile("/market", "fa-store", "#8e44ad", "Marketplace", "Buy and sell produce."),
        schemes = tile("/schemes", "fa-landmark", "#2980b9", "Schemes", "Government and private support."),
        prices = tile("/prices", "fa-chart-line", "#c0392b", "Mandi Prices", "Today's market rates."),
        assistant = tile("/assistant", "fa-robot", "#16a085", "Krishi Mitra", "Ask the AI assistant."),
    );
    layout("Dashboard", Some(Nav::Home), &body)
}

fn risk_color(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "#c0392b",
        RiskLevel::Medium => "orange",
        RiskLevel::Low => "#f1c40f",
        RiskLevel::None => "var(--primary)",
    }
}

pub fn scan_page(diagnosis: Option<&Diagnosis>) -> String {
    let content = match diagnosis {
        Some(d) => format!(
            r#"<div class="card" style="border: 2px solid {color};">
    <h1 style="color:var(--primary);">{name}</h1>
    <p><strong>Risk:</strong> {risk} &middot; <strong>Confidence:</strong> {confidence}%</p>
    <p>{symptoms}</p>
    <div style="background:#e8f5e9; padding:10px; margin:10px 0;"><strong>Organic:</strong> {organic}</div>
    <div style="background:#fff3cd; padding:10px; margin:10px 0;"><strong>Chemical:</strong> {chemical}</div>
    <img class="photo" src="/static/uploads/{file}" alt="Uploaded crop photo">
    <a href="/scan" class="btn">Check Another</a>
</div>"#,
            color = risk_color(d.record.risk),
            name = escape(d.record.name),
            risk = d.record.risk.as_str(),
            confidence = d.confidence,
            symptoms = escape(d.record.symptoms),
            organic = escape(d.record.treatment_organic),
            chemical = escape(d.record.treatment_chemical),
            file = escape(&d.stored_file),
        ),
        None => r#"<div class="card" style="border: 2px dashed #ccc; padding: 40px;" onclick="document.getElementById('f').click()">
    <i class="fas fa-camera fa-4x" style="color:#ccc;"></i>
    <p>Tap to Upload</p>
    <form method="POST" action="/scan" enctype="multipart/form-data">
        <input type="file" name="file" id="f" accept="image/*" hidden onchange="this.form.submit()">
    </form>
</div>"#
            .to_string(),
    };

    let body = format!(
        r#"<div style="padding:20px; text-align:center;">
    <h2>Crop Doctor</h2>
    {content}
</div>"#
    );
    layout("Crop Doctor", Some(Nav::Scan), &body)
}

fn tag_chips(selected: Option<&str>) -> String {
    let mut chips = String::new();
    let all_class = if selected.is_none() { "chip active" } else { "chip" };
    chips.push_str(&format!(r#"<a class="{all_class}" href="/community">All</a>"#));
    for tag in CROP_TAGS {
        let class = if selected == Some(*tag) { "chip active" } else { "chip" };
        chips.push_str(&format!(
            r#"<a class="{class}" href="/community?tag={tag}">{tag}</a>"#
        ));
    }
    chips
}

fn post_card(post: &CommunityPost, liked: bool) -> String {
    let image = if post.has_image {
        format!(
            r#"<img class="photo" src="/community/{}/image" alt="Post photo">"#,
            post.id
        )
    } else {
        String::new()
    };

    let comments: String = post
        .comments
        .iter()
        .map(|c| {
            format!(
                r#"<p style="margin:4px 0;"><strong>{}</strong> {}</p>"#,
                escape(&c.author_name),
                escape(&c.content)
            )
        })
        .collect();

    format!(
        r#"<div class="card" style="text-align:left; padding:15px;">
    <strong>{author}</strong> <span class="chip">{tag}</span>
    <span class="muted" style="float:right;">{when}</span>
    <p>{content}</p>
    {image}
    <form method="POST" action="/community/{id}/like" style="display:inline;">
        <button class="btn small{liked_class}"><i class="fas fa-heart"></i> {likes}</button>
    </form>
    <span class="muted">{comment_count} comments</span>
    {comments}
    <form method="POST" action="/community/{id}/comment" style="display:flex; gap:5px; margin-top:8px;">
        <input type="text" name="content" placeholder="Write a reply..." required style="margin:0;">
        <button class="btn small">Reply</button>
    </form>
</div>"#,
        author = escape(&post.author_name),
        tag = escape(&post.tag),
        when = post.created_at.format("%d %b %Y, %H:%M"),
        content = escape(&post.content),
        id = post.id,
        liked_class = if liked { " liked" } else { "" },
        likes = post.like_count,
        comment_count = post.comment_count,
    )
}

pub fn community_page(posts: &[CommunityPost], liked: &[Uuid], selected_tag: Option<&str>) -> String {
    let options: String = CROP_TAGS
        .iter()
        .map(|tag| format!(r#"<option value="{tag}">{tag}</option>"#))
        .collect();

    let feed: String = if posts.is_empty() {
        r#"<p class="muted" style="text-align:center;">No posts yet. Be the first to ask!</p>"#.to_string()
    } else {
        posts
            .iter()
            .map(|p| post_card(p, liked.contains(&p.id)))
            .collect()
    };

    let body = format!(
        r#"<div class="top-nav"><h3>Community</h3></div>
<div style="padding:15px;">
    <form method="POST" action="/community" enctype="multipart/form-data" class="card">
        <textarea name="content" placeholder="Ask a question..." required></textarea>
        <select name="tag">{options}</select>
        <input type="file" name="image" accept="image/*">
        <button class="btn"><i class="fas fa-paper-plane"></i> Post</button>
    </form>
    <div>{chips}</div>
    {feed}
</div>"#,
        chips = tag_chips(selected_tag),
    );
    layout("Community", Some(Nav::Community), &body)
}

pub fn market_page(products: &[Product]) -> String {
    let listings: String = if products.is_empty() {
        r#"<p class="muted" style="text-align:center;">No listings yet.</p>"#.to_string()
    } else {
        products
            .iter()
            .map(|p| {
                let image = if p.has_image {
                    format!(r#"<img class="photo" src="/market/{}/image" alt="Product photo">"#, p.id)
                } else {
                    String::new()
                };
                format!(
                    r#"<div class="card">
    <h3>{name} <span style="float:right; color:var(--primary);">{price}</span></h3>
    <p>{description}</p>
    {image}
    <p class="muted"><i class="fas fa-map-marker-alt"></i> {location} &middot; Seller: {seller}</p>
    <a class="btn small" href="tel:{contact}"><i class="fas fa-phone"></i> {contact}</a>
</div>"#,
                    name = escape(&p.name),
                    price = escape(&p.price),
                    description = escape(&p.description),
                    location = escape(&p.location),
                    seller = escape(&p.seller_name),
                    contact = escape(&p.contact),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<div class="top-nav"><h3>Marketplace</h3></div>
<form method="POST" action="/market" enctype="multipart/form-data" class="card">
    <input type="text" name="name" placeholder="What are you selling?" required>
    <textarea name="description" placeholder="Description"></textarea>
    <input type="text" name="price" placeholder="Price (e.g. ₹2200 / quintal)" required>
    <input type="text" name="location" placeholder="Village / District">
    <input type="tel" name="contact" placeholder="Contact number (defaults to yours)">
    <input type="file" name="image" accept="image/*">
    <button class="btn">List Product</button>
</form>
{listings}"#
    );
    layout("Marketplace", Some(Nav::Market), &body)
}

pub fn schemes_page(schemes: &[Scheme], selected: Option<SchemeKind>) -> String {
    let chip = |kind: Option<SchemeKind>| {
        let class = if kind == selected { "chip active" } else { "chip" };
        match kind {
            Some(k) => format!(
                r#"<a class="{class}" href="/schemes?kind={}">{}</a>"#,
                k.as_str(),
                k.label()
            ),
            None => format!(r#"<a class="{class}" href="/schemes">All</a>"#),
        }
    };

    let cards: String = schemes
        .iter()
        .map(|s| {
            format!(
                r#"<div class="card">
    <h3>{name}</h3> <span class="chip">{kind}</span>
    <p>{description}</p>
    <p><strong>Eligibility:</strong> {eligibility}</p>
    <a class="btn small" href="{link}" target="_blank" rel="noopener">Apply / Learn more</a>
</div>"#,
                name = escape(&s.name),
                kind = s.kind.label(),
                description = escape(&s.description),
                eligibility = escape(&s.eligibility),
                link = escape(&s.link),
            )
        })
        .collect();

    let body = format!(
        r#"<div class="top-nav"><h3>Schemes</h3></div>
<div style="padding:15px;">{}{}{}</div>
{cards}"#,
        chip(None),
        chip(Some(SchemeKind::Government)),
        chip(Some(SchemeKind::Private)),
    );
    layout("Schemes", Some(Nav::Home), &body)
}

pub fn prices_page(markets: &[String], selected: Option<&str>, quotes: &[PriceQuote]) -> String {
    let options: String = markets
        .iter()
        .map(|m| {
            let sel = if Some(m.as_str()) == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{sel}>{0}</option>"#, escape(m))
        })
        .collect();

    let rows: String = quotes
        .iter()
        .map(|q| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>",
                escape(&q.crop),
                escape(&q.variety),
                q.min_price,
                q.max_price,
                q.modal_price
            )
        })
        .collect();

    let table = if quotes.is_empty() {
        r#"<p class="muted">No prices available for this market.</p>"#.to_string()
    } else {
        format!(
            r#"<table><thead><tr><th>Crop</th><th>Variety</th><th>Min</th><th>Max</th><th>Modal</th></tr></thead><tbody>{rows}</tbody></table>
<p class="muted">Rs per quintal &middot; {date}</p>"#,
            date = escape(&quotes[0].date),
        )
    };

    let body = format!(
        r#"<div class="top-nav"><h3>Mandi Prices</h3></div>
<div class="card">
    <form method="GET" action="/prices">
        <select name="market" onchange="this.form.submit()">{options}</select>
    </form>
    {table}
</div>"#
    );
    layout("Mandi Prices", Some(Nav::Home), &body)
}

pub fn assistant_page(history: &[ChatMessage]) -> String {
    let bubbles: String = if history.is_empty() {
        r#"<p class="muted">Ask anything about crops, soil, pests or weather. You can also upload a crop photo.</p>"#.to_string()
    } else {
        history
            .iter()
            .map(|m| {
                let class = match m.role {
                    ChatRole::User => "bubble user",
                    ChatRole::Assistant => "bubble assistant",
                };
                format!(r#"<div class="{class}">{}</div>"#, escape(&m.content))
            })
            .collect()
    };

    let body = format!(
        r#"<div class="top-nav"><h3>Krishi Mitra</h3><p>Your AI farming assistant</p></div>
<div class="card">{bubbles}</div>
<form method="POST" action="/assistant" class="card" style="display:flex; gap:5px;">
    <input type="text" name="message" placeholder="Type your question..." required style="margin:0;">
    <button class="btn small"><i class="fas fa-paper-plane"></i></button>
</form>
<form method="POST" action="/assistant/analyze" enctype="multipart/form-data" class="card">
    <p><strong>Analyze a crop photo</strong></p>
    <input type="file" name="image" accept="image/*" required>
    <button class="btn">Analyze</button>
</form>"#
    );
    layout("Krishi Mitra", Some(Nav::Assistant), &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="card" style="text-align:center; margin-top:80px;">
    <h2>{code}</h2>
    <p>{message}</p>
    <a class="btn" href="/dashboard">Back to Home</a>
</div>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    layout("Error", None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_login_page_has_no_nav() {
        let html = login_page(None);
        assert!(html.contains(r#"name="phone""#));
        assert!(!html.contains("bottom-nav"));
    }

    #[test]
    fn test_post_content_is_escaped() {
        let post = CommunityPost {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_name: "Farmer 0001".to_string(),
            content: "<b>bold</b>".to_string(),
            tag: "General".to_string(),
            created_at: Utc::now(),
            has_image: false,
            like_count: 3,
            comment_count: 0,
            comments: Vec::new(),
        };
        let html = community_page(&[post], &[], None);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_active_nav_item() {
        let html = layout("x", Some(Nav::Market), "");
        assert!(html.contains(r#"href="/market" class="nav-item active""#));
        assert!(html.contains(r#"href="/community" class="nav-item""#));
    }

    #[test]
    fn test_empty_price_table_message() {
        let html = prices_page(&["Indore".to_string()], Some("Atlantis"), &[]);
        assert!(html.contains("No prices available"));
    }
}
