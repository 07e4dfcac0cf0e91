use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Tasa de cambio vigente: bolívares por unidad de cada divisa.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExchangeRate {
    pub id: i64,
    pub usd_rate: Decimal,
    pub eur_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertRateRequest {
    pub usd_rate: Decimal,
    pub eur_rate: Decimal,
}
