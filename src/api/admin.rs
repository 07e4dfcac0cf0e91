use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{is_staff_user, AppState, AuthUser};
use crate::models::{
    ClassifyDelinquencyRequest, ClassifyDelinquencyResponse, CloseMonthRequest, DashboardResponse,
    ExchangeRate, GenerateChargesRequest, GenerateChargesResponse, MonthClosure, UpsertRateRequest,
};
use crate::services::{
    ChargesService, ClosureService, DashboardService, DelinquencyService, RateService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/charges/generate", post(generate_charges))
        .route("/delinquency/classify", post(classify_delinquency))
        .route("/month-closures", post(close_month))
        .route("/dashboard", get(get_dashboard))
        .route("/rates", post(upsert_rate))
}

fn check_staff(user: &AuthUser) -> AppResult<()> {
    if !is_staff_user(user) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct DashboardQuery {
    pub condominium_id: Option<i64>,
    /// Inicio del rango de pagos 'YYYY-MM-DD'; por defecto 30 días atrás.
    pub from: Option<String>,
    /// Fin del rango de pagos 'YYYY-MM-DD'; por defecto hoy.
    pub to: Option<String>,
}

fn parse_range_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("{} debe tener formato 'YYYY-MM-DD'", field))
    })
}

/// Generar cargos mensuales para todas las unidades de un condominio
#[utoipa::path(
    post,
    path = "/api/v1/admin/charges/generate",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = GenerateChargesRequest,
    responses(
        (status = 200, description = "Resultado de la generación", body = GenerateChargesResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "Condominio no encontrado"),
        (status = 422, description = "Parámetros inválidos")
    )
)]
pub async fn generate_charges(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<GenerateChargesRequest>,
) -> AppResult<Json<GenerateChargesResponse>> {
    check_staff(&auth_user)?;

    let result = ChargesService::generate_monthly_charges(&state.pool, payload).await?;
    Ok(Json(result))
}

/// Reclasificar morosidad por fecha de corte
#[utoipa::path(
    post,
    path = "/api/v1/admin/delinquency/classify",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = ClassifyDelinquencyRequest,
    responses(
        (status = 200, description = "Deudas marcadas y desmarcadas", body = ClassifyDelinquencyResponse),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 422, description = "Parámetros inválidos")
    )
)]
pub async fn classify_delinquency(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ClassifyDelinquencyRequest>,
) -> AppResult<Json<ClassifyDelinquencyResponse>> {
    check_staff(&auth_user)?;

    let result = DelinquencyService::classify_delinquency(&state.pool, payload).await?;
    Ok(Json(result))
}

/// Cerrar el mes contable de un condominio
#[utoipa::path(
    post,
    path = "/api/v1/admin/month-closures",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CloseMonthRequest,
    responses(
        (status = 200, description = "Cierre registrado", body = MonthClosure),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 404, description = "Condominio no encontrado"),
        (status = 409, description = "El mes ya fue cerrado"),
        (status = 422, description = "Parámetros inválidos")
    )
)]
pub async fn close_month(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CloseMonthRequest>,
) -> AppResult<Json<MonthClosure>> {
    check_staff(&auth_user)?;

    let closure = ClosureService::close_month(&state.pool, payload).await?;
    Ok(Json(closure))
}

/// Tablero administrativo de deudas y pagos
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Agregados del período", body = DashboardResponse),
        (status = 400, description = "Rango de fechas inválido"),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    check_staff(&auth_user)?;

    let to = match query.to.as_deref() {
        Some(raw) => parse_range_date(raw, "to")?,
        None => Utc::now().date_naive(),
    };
    let from = match query.from.as_deref() {
        Some(raw) => parse_range_date(raw, "from")?,
        None => to.checked_sub_signed(Duration::days(30)).ok_or_else(|| {
            AppError::BadRequest("to queda fuera del rango de fechas soportado".to_string())
        })?,
    };
    if from > to {
        return Err(AppError::BadRequest(
            "from no puede ser posterior a to".to_string(),
        ));
    }

    let dashboard = DashboardService::dashboard(&state.pool, query.condominium_id, from, to).await?;
    Ok(Json(dashboard))
}

/// Actualizar la tasa de cambio vigente
#[utoipa::path(
    post,
    path = "/api/v1/admin/rates",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = UpsertRateRequest,
    responses(
        (status = 200, description = "Tasa vigente actualizada", body = ExchangeRate),
        (status = 401, description = "No autorizado"),
        (status = 403, description = "Solo personal administrativo"),
        (status = 422, description = "Tasas no positivas")
    )
)]
pub async fn upsert_rate(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpsertRateRequest>,
) -> AppResult<Json<ExchangeRate>> {
    check_staff(&auth_user)?;

    let rate = RateService::upsert_current_rate(&state.pool, payload).await?;
    Ok(Json(rate))
}
