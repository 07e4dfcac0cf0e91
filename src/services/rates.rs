use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{ExchangeRate, UpsertRateRequest};

/// Proveedor de tasas: la fila más reciente es la autoritativa.
pub struct RateService;

impl RateService {
    pub async fn latest_rate(pool: &PgPool) -> AppResult<Option<ExchangeRate>> {
        let rate = sqlx::query_as::<_, ExchangeRate>(
            r#"
            SELECT * FROM exchange_rates
            ORDER BY COALESCE(updated_at, created_at) DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(rate)
    }

    /// Actualiza la tasa vigente o crea la primera fila si no existe.
    pub async fn upsert_current_rate(
        pool: &PgPool,
        req: UpsertRateRequest,
    ) -> AppResult<ExchangeRate> {
        if req.usd_rate <= Decimal::ZERO || req.eur_rate <= Decimal::ZERO {
            return Err(AppError::Validation(
                "usd_rate y eur_rate deben ser mayores que cero".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;

        let latest: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM exchange_rates
            ORDER BY COALESCE(updated_at, created_at) DESC, id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let rate = match latest {
            Some((id,)) => {
                sqlx::query_as::<_, ExchangeRate>(
                    r#"
                    UPDATE exchange_rates
                    SET usd_rate = $2, eur_rate = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(req.usd_rate)
                .bind(req.eur_rate)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExchangeRate>(
                    r#"
                    INSERT INTO exchange_rates (usd_rate, eur_rate)
                    VALUES ($1, $2)
                    RETURNING *
                    "#,
                )
                .bind(req.usd_rate)
                .bind(req.eur_rate)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        tracing::info!(
            "Exchange rate updated: USD {} / EUR {}",
            rate.usd_rate,
            rate.eur_rate
        );

        Ok(rate)
    }
}
