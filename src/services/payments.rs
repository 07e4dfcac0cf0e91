use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::{
    ApproveMovementResponse, Currency, Debt, Movement, MovementStatus, PaymentHistoryRow,
    PendingMovementRow, Receipt, ReceiptCategory, RejectMovementRequest, RejectMovementResponse,
    SubmitPaymentRequest, SubmitPaymentResponse,
};
use crate::utils::validators::{sanitize_string, validate_email, validate_reference};

/// Verifica que la terna movimiento/recibo/deuda siga admitiendo la
/// aprobación. Cada conflicto nombra la condición que falló.
fn check_approval_preconditions(
    status: MovementStatus,
    category: ReceiptCategory,
    debt_active: bool,
) -> AppResult<()> {
    if status != MovementStatus::Pending {
        return Err(AppError::Conflict(
            "El movimiento no está pendiente".to_string(),
        ));
    }
    if category != ReceiptCategory::Pendiente {
        return Err(AppError::Conflict(
            "El recibo no está pendiente".to_string(),
        ));
    }
    if !debt_active {
        return Err(AppError::Conflict(
            "La deuda ya no está activa".to_string(),
        ));
    }
    Ok(())
}

/// Moneda que hereda el movimiento desde la deuda: se normaliza cuando
/// es una de las conocidas y se conserva recortada cuando no; solo una
/// moneda en blanco cae a USD.
fn movement_currency(stored: &str) -> String {
    let trimmed = stored.trim();
    match Currency::parse(trimmed) {
        Some(currency) => currency.as_str().to_string(),
        None if trimmed.is_empty() => Currency::Usd.as_str().to_string(),
        None => trimmed.to_string(),
    }
}

/// Recalcula la bandera derivada `has_active_debt` de la unidad. Es el
/// único lugar del sistema que la escribe.
async fn refresh_unit_debt_flag(
    tx: &mut Transaction<'_, Postgres>,
    unit_id: i64,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE units
        SET has_active_debt = EXISTS (
                SELECT 1 FROM debts WHERE unit_id = $1 AND is_active = true
            ),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(unit_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

const PENDING_QUEUE_SQL: &str = r#"
    SELECT m.id, m.movement_date, m.reference, m.amount, m.currency,
           m.holder_name, m.holder_email, m.created_at,
           r.id AS receipt_id, r.debt_id,
           d.concept AS debt_concept,
           u.id AS unit_id, u.name AS unit_name
    FROM movements m
    JOIN receipts r ON r.movement_id = m.id
    JOIN debts d ON d.id = r.debt_id
    JOIN units u ON u.id = d.unit_id
    WHERE m.status = $1 AND r.category = $2
    ORDER BY m.created_at DESC
    LIMIT $3
"#;

/// Libro de pagos: reporte del propietario y decisión del administrador.
pub struct PaymentsService;

impl PaymentsService {
    /// Registra un reporte de pago sobre una deuda activa. Crea el
    /// movimiento pendiente, su recibo PENDIENTE y el ingreso asociado
    /// en una sola transacción.
    pub async fn submit_payment(
        pool: &PgPool,
        submitter_email: &str,
        req: SubmitPaymentRequest,
    ) -> AppResult<SubmitPaymentResponse> {
        let submitter_email = submitter_email.trim().to_lowercase();
        if !validate_email(&submitter_email) {
            return Err(AppError::Unauthorized);
        }

        let reference = sanitize_string(&req.reference);
        if !validate_reference(&reference) {
            return Err(AppError::Validation(
                "reference debe tener entre 4 y 40 caracteres alfanuméricos".to_string(),
            ));
        }
        if req.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "amount debe ser mayor que cero".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;

        // Bloquea la deuda y su unidad hasta confirmar el registro.
        let debt_row: Option<(i64, bool, String, i64, Option<i64>)> = sqlx::query_as(
            r#"
            SELECT d.id, d.is_active, d.currency, d.unit_id, u.owner_id
            FROM debts d
            JOIN units u ON u.id = d.unit_id
            WHERE d.id = $1
            FOR UPDATE
            "#,
        )
        .bind(req.debt_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (debt_id, is_active, debt_currency, _unit_id, owner_id) =
            debt_row.ok_or_else(|| AppError::NotFound("Deuda no encontrada".to_string()))?;

        if !is_active {
            return Err(AppError::Conflict(
                "La deuda ya no está activa".to_string(),
            ));
        }

        // Una unidad sin propietario registrado acepta cualquier reportante;
        // con propietario, el correo debe coincidir.
        let mut income_owner_id = None;
        if let Some(owner_id) = owner_id {
            let owner: Option<(i64, Option<String>)> = sqlx::query_as(
                r#"
                SELECT o.id, u.email
                FROM owners o
                LEFT JOIN users u ON u.id = o.user_id
                WHERE o.id = $1
                "#,
            )
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some((owner_id, owner_email)) = owner {
                if let Some(owner_email) = owner_email {
                    if owner_email.trim().to_lowercase() != submitter_email {
                        return Err(AppError::Forbidden);
                    }
                }
                income_owner_id = Some(owner_id);
            }
        }

        let currency = movement_currency(&debt_currency);
        let holder_name = req
            .holder_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&submitter_email)
            .to_string();
        let today = Utc::now().date_naive();

        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements
                (movement_date, description, reference, debit, credit, amount,
                 status, currency, concept, issuing_bank,
                 holder_name, holder_email, holder_phone, holder_document)
            VALUES ($1, $2, $3, 0, $4, $4, $5, $6, 'PAGO_DEUDA', $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(today)
        .bind(format!("Pago reportado por propietario (deuda #{})", debt_id))
        .bind(&reference)
        .bind(req.amount)
        .bind(MovementStatus::Pending)
        .bind(&currency)
        .bind(&req.issuing_bank)
        .bind(&holder_name)
        .bind(&submitter_email)
        .bind(&req.holder_phone)
        .bind(&req.holder_document)
        .fetch_one(&mut *tx)
        .await?;

        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            INSERT INTO receipts (description, amount, category, debt_id, movement_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(format!(
            "Reporte pendiente de pago deuda #{} (ref: {})",
            debt_id, reference
        ))
        .bind(req.amount)
        .bind(ReceiptCategory::Pendiente)
        .bind(debt_id)
        .bind(movement.id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(owner_id) = income_owner_id {
            sqlx::query("INSERT INTO incomes (kind, movement_id, owner_id) VALUES ('PAGO', $1, $2)")
                .bind(movement.id)
                .bind(owner_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Payment report registered: movement {} for debt {} ({} {})",
            movement.id,
            debt_id,
            req.amount,
            currency
        );

        Ok(SubmitPaymentResponse {
            movement_id: movement.id,
            receipt,
        })
    }

    /// Aprueba un movimiento pendiente: movimiento a APROBADO, recibo a
    /// PAGO, deuda cerrada y bandera de la unidad recalculada, todo en
    /// una transacción.
    pub async fn approve_movement(
        pool: &PgPool,
        movement_id: i64,
    ) -> AppResult<ApproveMovementResponse> {
        let mut tx = pool.begin().await?;

        let locked: Option<(i64, MovementStatus, i64, ReceiptCategory, i64, bool, i64)> =
            sqlx::query_as(
                r#"
                SELECT m.id, m.status, r.id, r.category, d.id, d.is_active, d.unit_id
                FROM movements m
                JOIN receipts r ON r.movement_id = m.id
                JOIN debts d ON d.id = r.debt_id
                WHERE m.id = $1
                FOR UPDATE
                "#,
            )
            .bind(movement_id)
            .fetch_optional(&mut *tx)
            .await?;

        let (movement_id, status, receipt_id, category, debt_id, debt_active, unit_id) = locked
            .ok_or_else(|| {
                AppError::NotFound("Movimiento no encontrado o sin recibo asociado".to_string())
            })?;

        check_approval_preconditions(status, category, debt_active)?;

        let movement = sqlx::query_as::<_, Movement>(
            "UPDATE movements SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(movement_id)
        .bind(MovementStatus::Approved)
        .fetch_one(&mut *tx)
        .await?;

        let receipt = sqlx::query_as::<_, Receipt>(
            "UPDATE receipts SET category = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(receipt_id)
        .bind(ReceiptCategory::Pago)
        .fetch_one(&mut *tx)
        .await?;

        let debt = sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debts
            SET is_active = false, is_delinquent = false, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(debt_id)
        .fetch_one(&mut *tx)
        .await?;

        refresh_unit_debt_flag(&mut tx, unit_id).await?;

        tx.commit().await?;

        tracing::info!(
            "Movement {} approved, debt {} settled, unit {} flag refreshed",
            movement_id,
            debt_id,
            unit_id
        );

        Ok(ApproveMovementResponse {
            movement,
            receipt,
            debt,
        })
    }

    /// Rechaza un movimiento pendiente dejando rastro del motivo en el
    /// movimiento y en su recibo. La deuda queda intacta.
    pub async fn reject_movement(
        pool: &PgPool,
        movement_id: i64,
        req: RejectMovementRequest,
    ) -> AppResult<RejectMovementResponse> {
        let reason = sanitize_string(&req.reason);
        if reason.is_empty() {
            return Err(AppError::Validation("reason es obligatorio".to_string()));
        }

        let mut tx = pool.begin().await?;

        // FOR UPDATE no aplica al lado externo del LEFT JOIN; se bloquea
        // solo el movimiento y el recibo se muta bajo ese candado.
        let locked: Option<(i64, MovementStatus, Option<i64>, Option<ReceiptCategory>)> =
            sqlx::query_as(
                r#"
                SELECT m.id, m.status, r.id, r.category
                FROM movements m
                LEFT JOIN receipts r ON r.movement_id = m.id
                WHERE m.id = $1
                FOR UPDATE OF m
                "#,
            )
            .bind(movement_id)
            .fetch_optional(&mut *tx)
            .await?;

        let (movement_id, status, receipt_id, category) = locked
            .ok_or_else(|| AppError::NotFound("Movimiento no encontrado".to_string()))?;

        if status != MovementStatus::Pending {
            return Err(AppError::Conflict(
                "El movimiento no está pendiente".to_string(),
            ));
        }

        let movement = sqlx::query_as::<_, Movement>(
            r#"
            UPDATE movements
            SET status = $2,
                description = description || ' | RECHAZO: ' || $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(movement_id)
        .bind(MovementStatus::Rejected)
        .bind(&reason)
        .fetch_one(&mut *tx)
        .await?;

        let receipt = match (receipt_id, category) {
            (Some(receipt_id), Some(ReceiptCategory::Pendiente)) => Some(
                sqlx::query_as::<_, Receipt>(
                    r#"
                    UPDATE receipts
                    SET category = $2,
                        description = 'RECHAZADO: ' || $3 || ' | ' || COALESCE(description, ''),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(receipt_id)
                .bind(ReceiptCategory::Rechazado)
                .bind(&reason)
                .fetch_one(&mut *tx)
                .await?,
            ),
            (Some(receipt_id), _) => Some(
                sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE id = $1")
                    .bind(receipt_id)
                    .fetch_one(&mut *tx)
                    .await?,
            ),
            _ => None,
        };

        tx.commit().await?;

        tracing::info!("Movement {} rejected: {}", movement_id, reason);

        Ok(RejectMovementResponse { movement, receipt })
    }

    /// Cola de movimientos pendientes con recibo PENDIENTE, más recientes
    /// primero.
    pub async fn list_pending(pool: &PgPool, limit: i64) -> AppResult<Vec<PendingMovementRow>> {
        let rows = sqlx::query_as::<_, PendingMovementRow>(PENDING_QUEUE_SQL)
            .bind(MovementStatus::Pending)
            .bind(ReceiptCategory::Pendiente)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    pub async fn movement_detail(
        pool: &PgPool,
        movement_id: i64,
    ) -> AppResult<(Movement, Option<Receipt>)> {
        let movement = sqlx::query_as::<_, Movement>("SELECT * FROM movements WHERE id = $1")
            .bind(movement_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Movimiento no encontrado".to_string()))?;

        let receipt = sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE movement_id = $1")
            .bind(movement_id)
            .fetch_optional(pool)
            .await?;

        Ok((movement, receipt))
    }

    /// Historial de movimientos reportados por un correo, más recientes
    /// primero.
    pub async fn history_for_holder(
        pool: &PgPool,
        holder_email: &str,
        status: Option<MovementStatus>,
        limit: i64,
    ) -> AppResult<Vec<PaymentHistoryRow>> {
        let rows = sqlx::query_as::<_, PaymentHistoryRow>(
            r#"
            SELECT m.id, m.movement_date, m.description, m.reference, m.amount,
                   m.currency, m.status, m.created_at,
                   r.id AS receipt_id, r.category AS receipt_category,
                   r.debt_id AS debt_id, d.concept AS debt_concept
            FROM movements m
            LEFT JOIN receipts r ON r.movement_id = m.id
            LEFT JOIN debts d ON d.id = r.debt_id
            WHERE LOWER(m.holder_email) = LOWER($1)
              AND ($2::smallint IS NULL OR m.status = $2)
            ORDER BY m.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(holder_email)
        .bind(status)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_preconditions_ok() {
        assert!(check_approval_preconditions(
            MovementStatus::Pending,
            ReceiptCategory::Pendiente,
            true
        )
        .is_ok());
    }

    #[test]
    fn test_approval_rejects_non_pending_movement() {
        let err = check_approval_preconditions(
            MovementStatus::Approved,
            ReceiptCategory::Pendiente,
            true,
        )
        .unwrap_err();

        match err {
            AppError::Conflict(msg) => assert!(msg.contains("movimiento")),
            other => panic!("se esperaba Conflict, llegó {:?}", other),
        }
    }

    #[test]
    fn test_approval_rejects_settled_receipt() {
        let err =
            check_approval_preconditions(MovementStatus::Pending, ReceiptCategory::Pago, true)
                .unwrap_err();

        match err {
            AppError::Conflict(msg) => assert!(msg.contains("recibo")),
            other => panic!("se esperaba Conflict, llegó {:?}", other),
        }
    }

    #[test]
    fn test_approval_rejects_closed_debt() {
        let err = check_approval_preconditions(
            MovementStatus::Pending,
            ReceiptCategory::Pendiente,
            false,
        )
        .unwrap_err();

        match err {
            AppError::Conflict(msg) => assert!(msg.contains("deuda")),
            other => panic!("se esperaba Conflict, llegó {:?}", other),
        }
    }

    #[test]
    fn test_rejected_movement_is_terminal() {
        let err = check_approval_preconditions(
            MovementStatus::Rejected,
            ReceiptCategory::Pendiente,
            true,
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_movement_currency_normalizes_known_values() {
        assert_eq!(movement_currency(" usd "), "USD");
        assert_eq!(movement_currency("EUR"), "EUR");
        assert_eq!(movement_currency("bs"), "BS");
    }

    #[test]
    fn test_movement_currency_falls_back_only_when_blank() {
        // Una moneda heredada que no es del conjunto conocido viaja tal
        // cual; solo el blanco cae a USD.
        assert_eq!(movement_currency("COP"), "COP");
        assert_eq!(movement_currency(" VES "), "VES");
        assert_eq!(movement_currency(""), "USD");
        assert_eq!(movement_currency("   "), "USD");
    }

    #[test]
    fn test_pending_queue_lists_newest_first() {
        assert!(PENDING_QUEUE_SQL.contains("ORDER BY m.created_at DESC"));
    }

    // Pool diferido sin conexión real: los errores de validación deben
    // salir antes de tocar la base.
    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/condopago")
            .unwrap()
    }

    #[tokio::test]
    async fn test_reject_requires_non_empty_reason() {
        for reason in ["", "   "] {
            let req = RejectMovementRequest {
                reason: reason.to_string(),
            };

            let err = PaymentsService::reject_movement(&lazy_pool(), 1, req)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }
}
