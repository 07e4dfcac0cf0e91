use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Condominium {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub balance_bs: Decimal,
    pub balance_usd: Decimal,
    pub balance_eur: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
