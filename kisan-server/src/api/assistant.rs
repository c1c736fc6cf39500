use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use uuid::Uuid;

use kisan_types::{ChatForm, ChatMessage, ChatRole};

use super::{form_data::FormData, AppResult};
use crate::assistant::reply_or_fallback;
use crate::db::repositories::ChatRepository;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views;

fn message(user_id: Uuid, role: ChatRole, content: String) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        user_id,
        role,
        content,
        created_at: Utc::now(),
    }
}

/// GET /assistant
pub async fn chat_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let history = ChatRepository::new(state.db.pool.clone()).history(&current.user.id)?;
    Ok(Html(views::assistant_page(&history)))
}

/// POST /assistant - ask a question; failures show the fallback reply
pub async fn send_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<ChatForm>,
) -> AppResult<Response> {
    let question = form.message.trim();
    if question.is_empty() {
        return Ok(Redirect::to("/assistant").into_response());
    }

    let repo = ChatRepository::new(state.db.pool.clone());
    repo.append(&message(current.user.id, ChatRole::User, question.to_string()))?;

    let reply = reply_or_fallback(state.assistant.chat(question).await);
    repo.append(&message(current.user.id, ChatRole::Assistant, reply))?;

    Ok(Redirect::to("/assistant").into_response())
}

/// POST /assistant/analyze - multipart field `image`
pub async fn analyze_photo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = FormData::read(multipart).await?;
    let Some(image) = form.take_image("image") else {
        return Ok(Redirect::to("/assistant").into_response());
    };

    let repo = ChatRepository::new(state.db.pool.clone());
    repo.append(&message(
        current.user.id,
        ChatRole::User,
        format!("[Photo: {}]", image.file_name),
    ))?;

    let reply = reply_or_fallback(
        state
            .assistant
            .analyze_image(&image.content_type, &image.bytes)
            .await,
    );
    repo.append(&message(current.user.id, ChatRole::Assistant, reply))?;

    Ok(Redirect::to("/assistant").into_response())
}
