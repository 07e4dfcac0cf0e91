use axum::{extract::State, routing::get, Json, Router};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::ExchangeRate;
use crate::services::RateService;

pub fn routes() -> Router<AppState> {
    Router::new().route("/current", get(get_current_rate))
}

/// Tasa de cambio vigente
#[utoipa::path(
    get,
    path = "/api/v1/rates/current",
    tag = "rates",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tasa vigente", body = ExchangeRate),
        (status = 401, description = "No autorizado"),
        (status = 404, description = "No hay tasa registrada")
    )
)]
pub async fn get_current_rate(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<ExchangeRate>> {
    let rate = RateService::latest_rate(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No hay tasa de cambio registrada".to_string()))?;

    Ok(Json(rate))
}
