use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{CloseMonthRequest, DueDate, MonthClosure};
use crate::services::DirectoryService;

/// Cierre contable de mes por condominio.
pub struct ClosureService;

impl ClosureService {
    /// Registra la marca de cierre. Un mes ya cerrado produce conflicto;
    /// la restricción única respalda el chequeo ante corridas simultáneas.
    pub async fn close_month(pool: &PgPool, req: CloseMonthRequest) -> AppResult<MonthClosure> {
        let closure_month = DueDate::parse(&req.month)
            .map(|due| due.month_start())
            .ok_or_else(|| {
                AppError::Validation("month debe tener formato 'YYYY-MM' o 'YYYY-MM-DD'".to_string())
            })?;

        let condominium = DirectoryService::find_condominium(pool, req.condominium_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Condominio no encontrado".to_string()))?;

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM month_closures WHERE condominium_id = $1 AND closure_month = $2",
        )
        .bind(req.condominium_id)
        .bind(closure_month)
        .fetch_optional(pool)
        .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "El mes ya fue cerrado para este condominio".to_string(),
            ));
        }

        let closure = sqlx::query_as::<_, MonthClosure>(
            r#"
            INSERT INTO month_closures (condominium_id, closure_month)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(req.condominium_id)
        .bind(closure_month)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            "Month {} closed for condominium '{}'",
            closure_month.format("%Y-%m"),
            condominium.name
        );

        Ok(closure)
    }
}
