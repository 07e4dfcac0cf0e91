use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, AppResult};
use crate::middleware::{is_staff_user, AppState, AuthUser};
use crate::models::OwnerSummaryResponse;
use crate::services::SummaryService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/summary", get(get_my_summary))
        .route("/by-user/:user_id/summary", get(get_summary_by_user))
}

/// Resumen financiero del propietario autenticado
#[utoipa::path(
    get,
    path = "/api/v1/owners/me/summary",
    tag = "owners",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resumen del propietario", body = OwnerSummaryResponse),
        (status = 401, description = "No autorizado"),
        (status = 404, description = "El usuario no tiene propietario asociado")
    )
)]
pub async fn get_my_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<OwnerSummaryResponse>> {
    let summary = SummaryService::owner_summary_by_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(summary))
}

/// Resumen financiero de cualquier propietario, para administración
#[utoipa::path(
    get,
    path = "/api/v1/owners/by-user/{user_id}/summary",
    tag = "owners",
    security(("bearer_auth" = [])),
    params(("user_id" = i64, Path, description = "ID del usuario vinculado al propietario")),
    responses(
        (status = 200, description = "Resumen del propietario", body = OwnerSummaryResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "El usuario no tiene propietario asociado")
    )
)]
pub async fn get_summary_by_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<OwnerSummaryResponse>> {
    if !is_staff_user(&auth_user) {
        return Err(AppError::Forbidden);
    }

    let summary = SummaryService::owner_summary_by_user(&state.pool, user_id).await?;
    Ok(Json(summary))
}
