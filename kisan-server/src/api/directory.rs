use axum::{
    extract::{Query, State},
    response::Html,
};

use kisan_types::{PriceQuery, SchemeKind, SchemeQuery};

use super::AppResult;
use crate::db::repositories::{PriceRepository, SchemeRepository};
use crate::state::AppState;
use crate::views;

/// GET /schemes - optionally filtered with ?kind=government|private
pub async fn schemes(
    State(state): State<AppState>,
    Query(query): Query<SchemeQuery>,
) -> AppResult<Html<String>> {
    let kind = query.kind.as_deref().and_then(SchemeKind::parse);
    let schemes = SchemeRepository::new(state.db.pool.clone()).list(kind)?;
    Ok(Html(views::schemes_page(&schemes, kind)))
}

/// GET /prices - quotes for ?market=..., defaulting to the first market
pub async fn prices(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> AppResult<Html<String>> {
    let repo = PriceRepository::new(state.db.pool.clone());
    let markets = repo.markets()?;

    let selected = query
        .market
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| markets.first().cloned());

    let quotes = match selected.as_deref() {
        Some(market) => repo.list_for_market(market)?,
        None => Vec::new(),
    };

    Ok(Html(views::prices_page(&markets, selected.as_deref(), &quotes)))
}
