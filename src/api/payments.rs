use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::AppResult;
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    MovementStatus, PaymentHistoryQuery, PaymentHistoryRow, SubmitPaymentRequest,
    SubmitPaymentResponse,
};
use crate::services::PaymentsService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_payment))
        .route("/history", get(get_history))
        .route("/pending", get(get_pending))
}

/// Reportar el pago de una deuda
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    request_body = SubmitPaymentRequest,
    responses(
        (status = 200, description = "Reporte registrado", body = SubmitPaymentResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "La deuda pertenece a otro propietario"),
        (status = 404, description = "Deuda no encontrada"),
        (status = 409, description = "La deuda ya no está activa"),
        (status = 422, description = "Referencia o monto inválidos")
    )
)]
pub async fn submit_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<SubmitPaymentRequest>,
) -> AppResult<Json<SubmitPaymentResponse>> {
    let result = PaymentsService::submit_payment(&state.pool, &auth_user.email, payload).await?;
    Ok(Json(result))
}

/// Historial de pagos reportados por el usuario
#[utoipa::path(
    get,
    path = "/api/v1/payments/history",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(PaymentHistoryQuery),
    responses(
        (status = 200, description = "Movimientos del usuario", body = Vec<PaymentHistoryRow>),
        (status = 401, description = "No autorizado")
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<PaymentHistoryQuery>,
) -> AppResult<Json<Vec<PaymentHistoryRow>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let rows =
        PaymentsService::history_for_holder(&state.pool, &auth_user.email, query.status, limit)
            .await?;
    Ok(Json(rows))
}

/// Reportes de pago del usuario aún pendientes de revisión
#[utoipa::path(
    get,
    path = "/api/v1/payments/pending",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Movimientos pendientes del usuario", body = Vec<PaymentHistoryRow>),
        (status = 401, description = "No autorizado")
    )
)]
pub async fn get_pending(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<PaymentHistoryRow>>> {
    let rows = PaymentsService::history_for_holder(
        &state.pool,
        &auth_user.email,
        Some(MovementStatus::Pending),
        50,
    )
    .await?;
    Ok(Json(rows))
}
