use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::debt::Debt;
use super::movement::PaymentHistoryRow;
use super::rate::ExchangeRate;
use super::unit::{Owner, Unit};

/// Totales por moneda nativa, sin convertir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MoneyTotals {
    pub usd: Decimal,
    pub eur: Decimal,
    pub bs: Decimal,
}

impl MoneyTotals {
    pub const ZERO: MoneyTotals = MoneyTotals {
        usd: Decimal::ZERO,
        eur: Decimal::ZERO,
        bs: Decimal::ZERO,
    };
}

/// Totales expresados en cada moneda usando la tasa vigente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Equivalents {
    pub total_bs: Decimal,
    pub total_usd: Decimal,
    pub total_eur: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CondominiumTotals {
    pub condominium_id: i64,
    pub condominium_name: String,
    pub totals: MoneyTotals,
    /// None cuando no hay tasa registrada o la tasa no es positiva.
    pub equivalents: Option<Equivalents>,
}

/// Vista agregada de deudas: global y particionada por condominio.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebtTotalsView {
    pub totals: MoneyTotals,
    pub equivalents: Option<Equivalents>,
    pub by_condominium: Vec<CondominiumTotals>,
}

/// Fila mínima que consume el agregador de monedas.
#[derive(Debug, Clone, FromRow)]
pub struct DebtTotalsRow {
    pub currency: String,
    pub amount: Decimal,
    pub is_delinquent: bool,
    pub condominium_id: i64,
    pub condominium_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerSummaryResponse {
    pub owner: Owner,
    pub units: Vec<Unit>,
    pub active_debts: Vec<Debt>,
    pub movements: Vec<PaymentHistoryRow>,
    pub current_rate: Option<ExchangeRate>,
    /// Totales de deuda activa, morosos incluidos.
    pub totals: DebtTotalsView,
    /// Totales de deuda activa excluyendo las deudas morosas.
    pub totals_excluding_delinquent: DebtTotalsView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebtAggregate {
    pub count: i64,
    pub totals: MoneyTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentsAggregate {
    pub count: i64,
    pub totals: MoneyTotals,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TopDebtorRow {
    pub unit_id: i64,
    pub unit_name: String,
    pub tower_name: String,
    pub condominium_name: String,
    pub debt_count: i64,
    pub total_usd: Decimal,
    pub total_eur: Decimal,
    pub total_bs: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub active_debts: DebtAggregate,
    pub delinquent_debts: DebtAggregate,
    pub approved_payments: PaymentsAggregate,
    pub top_debtors: Vec<TopDebtorRow>,
}
