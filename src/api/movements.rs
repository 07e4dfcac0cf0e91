use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{is_staff_user, AppState, AuthUser};
use crate::models::{
    ApproveMovementResponse, MovementDetailResponse, PendingMovementRow, RejectMovementRequest,
    RejectMovementResponse,
};
use crate::services::PaymentsService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pending", get(list_pending))
        .route("/:id", get(get_movement))
        .route("/:id/approve", put(approve_movement))
        .route("/:id/reject", put(reject_movement))
}

fn check_staff(user: &AuthUser) -> AppResult<()> {
    if !is_staff_user(user) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PendingQuery {
    pub limit: Option<i64>,
}

/// Cola de movimientos pendientes de revisión
#[utoipa::path(
    get,
    path = "/api/v1/movements/pending",
    tag = "movements",
    security(("bearer_auth" = [])),
    params(PendingQuery),
    responses(
        (status = 200, description = "Movimientos pendientes", body = Vec<PendingMovementRow>),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo")
    )
)]
pub async fn list_pending(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<PendingQuery>,
) -> AppResult<Json<Vec<PendingMovementRow>>> {
    check_staff(&auth_user)?;

    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let rows = PaymentsService::list_pending(&state.pool, limit).await?;
    Ok(Json(rows))
}

/// Detalle de un movimiento y su recibo
#[utoipa::path(
    get,
    path = "/api/v1/movements/{id}",
    tag = "movements",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "ID del movimiento")),
    responses(
        (status = 200, description = "Movimiento", body = MovementDetailResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "Movimiento no encontrado")
    )
)]
pub async fn get_movement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MovementDetailResponse>> {
    check_staff(&auth_user)?;

    let (movement, receipt) = PaymentsService::movement_detail(&state.pool, id).await?;
    Ok(Json(MovementDetailResponse { movement, receipt }))
}

/// Aprobar un movimiento pendiente
#[utoipa::path(
    put,
    path = "/api/v1/movements/{id}/approve",
    tag = "movements",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "ID del movimiento")),
    responses(
        (status = 200, description = "Movimiento aprobado y deuda saldada", body = ApproveMovementResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "Movimiento no encontrado o sin recibo"),
        (status = 409, description = "Movimiento, recibo o deuda fuera de estado")
    )
)]
pub async fn approve_movement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApproveMovementResponse>> {
    check_staff(&auth_user)?;

    let result = PaymentsService::approve_movement(&state.pool, id).await?;
    Ok(Json(result))
}

/// Rechazar un movimiento pendiente con motivo
#[utoipa::path(
    put,
    path = "/api/v1/movements/{id}/reject",
    tag = "movements",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "ID del movimiento")),
    request_body = RejectMovementRequest,
    responses(
        (status = 200, description = "Movimiento rechazado", body = RejectMovementResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "Movimiento no encontrado"),
        (status = 409, description = "El movimiento no está pendiente"),
        (status = 422, description = "Motivo vacío")
    )
)]
pub async fn reject_movement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RejectMovementRequest>,
) -> AppResult<Json<RejectMovementResponse>> {
    check_staff(&auth_user)?;

    let result = PaymentsService::reject_movement(&state.pool, id, payload).await?;
    Ok(Json(result))
}
