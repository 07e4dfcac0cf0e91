use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Marca de cierre contable de un mes por condominio.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MonthClosure {
    pub id: i64,
    pub condominium_id: i64,
    pub closure_month: NaiveDate,
    pub closed_at: DateTime<Utc>,
    pub report_path: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseMonthRequest {
    pub condominium_id: i64,
    /// Mes a cerrar: 'YYYY-MM' o 'YYYY-MM-DD' (se trunca al mes).
    pub month: String,
}
