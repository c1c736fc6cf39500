use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use chrono::Utc;
use uuid::Uuid;

use kisan_types::Product;

use super::{form_data::FormData, image_response, parse_id, AppError, AppResult};
use crate::db::repositories::ProductRepository;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views;

/// GET /market
pub async fn listings(State(state): State<AppState>) -> AppResult<Html<String>> {
    let products = ProductRepository::new(state.db.pool.clone()).list()?;
    Ok(Html(views::market_page(&products)))
}

/// POST /market - name and price are required, contact defaults to the seller's phone
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = FormData::read(multipart).await?;

    let (Some(name), Some(price)) = (
        form.text("name").map(str::to_string),
        form.text("price").map(str::to_string),
    ) else {
        return Ok(Redirect::to("/market").into_response());
    };

    let image = form.take_image("image").map(|f| f.into_image());

    let product = Product {
        id: Uuid::new_v4(),
        seller_id: current.user.id,
        seller_name: current.user.name.clone(),
        name,
        description: form.text("description").unwrap_or_default().to_string(),
        price,
        location: form.text("location").unwrap_or_default().to_string(),
        contact: form
            .text("contact")
            .unwrap_or(current.user.phone.as_str())
            .to_string(),
        has_image: image.is_some(),
        created_at: Utc::now(),
    };

    ProductRepository::new(state.db.pool.clone()).create(&product, image.as_ref())?;
    tracing::info!("User {} listed product {}", current.user.id, product.id);

    Ok(Redirect::to("/market").into_response())
}

/// GET /market/:id/image
pub async fn product_image(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Response> {
    let product_id = parse_id(&product_id, "product")?;
    let image = ProductRepository::new(state.db.pool.clone())
        .get_image(&product_id)?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok(image_response(image))
}
