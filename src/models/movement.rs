use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::debt::Debt;

/// Estado del movimiento bancario. Se persiste como SMALLINT:
/// 0 = pendiente, 1 = aprobado, 2 = rechazado. Aprobado y rechazado
/// son estados terminales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i16)]
pub enum MovementStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

/// Categoría del recibo asociado a un reporte de pago.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "receipt_category", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceiptCategory {
    Pendiente,
    Pago,
    Rechazado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Movement {
    pub id: i64,
    pub movement_date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub amount: Decimal,
    pub status: MovementStatus,
    pub currency: String,
    pub concept: Option<String>,
    pub issuing_bank: Option<String>,
    /// Identidad del titular capturada al crear el movimiento; inmutable.
    pub holder_name: String,
    pub holder_email: String,
    pub holder_phone: Option<String>,
    pub holder_document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Receipt {
    pub id: i64,
    pub description: Option<String>,
    pub amount: Decimal,
    pub category: ReceiptCategory,
    pub debt_id: i64,
    pub movement_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitPaymentRequest {
    pub debt_id: i64,
    /// Referencia de la transferencia o depósito.
    pub reference: String,
    pub amount: Decimal,
    pub issuing_bank: Option<String>,
    pub holder_name: Option<String>,
    pub holder_phone: Option<String>,
    pub holder_document: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitPaymentResponse {
    pub movement_id: i64,
    pub receipt: Receipt,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectMovementRequest {
    /// Motivo del rechazo; obligatorio.
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApproveMovementResponse {
    pub movement: Movement,
    pub receipt: Receipt,
    pub debt: Debt,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RejectMovementResponse {
    pub movement: Movement,
    pub receipt: Option<Receipt>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementDetailResponse {
    pub movement: Movement,
    pub receipt: Option<Receipt>,
}

/// Fila de la cola de movimientos pendientes de revisión.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PendingMovementRow {
    pub id: i64,
    pub movement_date: NaiveDate,
    pub reference: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub holder_name: String,
    pub holder_email: String,
    pub created_at: DateTime<Utc>,
    pub receipt_id: i64,
    pub debt_id: i64,
    pub debt_concept: String,
    pub unit_id: i64,
    pub unit_name: String,
}

/// Fila del historial de pagos de un propietario.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PaymentHistoryRow {
    pub id: i64,
    pub movement_date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: MovementStatus,
    pub created_at: DateTime<Utc>,
    pub receipt_id: Option<i64>,
    pub receipt_category: Option<ReceiptCategory>,
    pub debt_id: Option<i64>,
    pub debt_concept: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaymentHistoryQuery {
    pub status: Option<MovementStatus>,
    pub limit: Option<i64>,
}
