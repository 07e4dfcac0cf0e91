use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Domicilio dentro de una torre del condominio.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub floor: Option<i32>,
    /// Alícuota: fracción de los gastos comunes que asume la unidad.
    pub quota_share: Option<Decimal>,
    pub parking_spaces: i32,
    pub tower_id: i64,
    pub condominium_id: i64,
    pub owner_id: Option<i64>,
    /// Bandera derivada; solo la recalcula el cierre de pagos.
    pub has_active_debt: bool,
    pub balance_bs: Option<Decimal>,
    pub balance_usd: Option<Decimal>,
    pub balance_eur: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Owner {
    pub id: i64,
    pub full_name: String,
    pub document_id: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
