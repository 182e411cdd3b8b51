//! # Chat Handlers

use axum::extract::State;
use axum::Json;

use crate::services::{ChatAnswer, ChatQuery};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// POST /chat/query
///
/// Advisory outages still answer 200 with the fallback message.
pub async fn query(
    State(state): State<AppState>,
    Json(query): Json<ChatQuery>,
) -> ApiResult<Json<ChatAnswer>> {
    let answer = state.services.chat.ask(query).await?;
    Ok(Json(answer))
}
