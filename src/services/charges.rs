use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Currency, DueDate, GenerateChargesRequest, GenerateChargesResponse};
use crate::services::DirectoryService;
use crate::utils::money::round_money;
use crate::utils::validators::sanitize_string;

/// Distribuye `total` entre las unidades en proporción a su alícuota.
/// Si la suma de alícuotas no es positiva, todas las cuotas quedan en cero.
pub fn prorate_amounts(total: Decimal, quotas: &[Decimal]) -> Vec<Decimal> {
    let quota_sum: Decimal = quotas.iter().copied().sum();
    if quota_sum <= Decimal::ZERO {
        return vec![Decimal::ZERO; quotas.len()];
    }
    quotas
        .iter()
        .map(|quota| round_money(total * quota / quota_sum))
        .collect()
}

/// Generación masiva de cargos mensuales.
pub struct ChargesService;

impl ChargesService {
    /// Crea una deuda por unidad del condominio para el mes indicado.
    /// Las unidades que ya tienen una deuda del mismo concepto en ese mes
    /// se omiten, por lo que repetir la corrida no duplica cargos.
    pub async fn generate_monthly_charges(
        pool: &PgPool,
        req: GenerateChargesRequest,
    ) -> AppResult<GenerateChargesResponse> {
        if req.condominium_id <= 0 {
            return Err(AppError::Validation(
                "condominium_id debe ser positivo".to_string(),
            ));
        }

        let charge_month = DueDate::parse(&req.month)
            .map(|due| due.month_start())
            .ok_or_else(|| {
                AppError::Validation("month debe tener formato 'YYYY-MM' o 'YYYY-MM-DD'".to_string())
            })?;

        let concept = sanitize_string(&req.concept);
        if concept.is_empty() {
            return Err(AppError::Validation("concept es obligatorio".to_string()));
        }

        let currency = Currency::parse(&req.currency).ok_or_else(|| {
            AppError::Validation("currency debe ser USD, EUR o BS".to_string())
        })?;

        // Monto según el modo de generación.
        let base_amount = if req.prorate {
            let total = req.total_amount.ok_or_else(|| {
                AppError::Validation(
                    "total_amount es obligatorio en modo prorrateado".to_string(),
                )
            })?;
            if total <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "total_amount debe ser mayor que cero".to_string(),
                ));
            }
            total
        } else {
            let amount = req.amount.ok_or_else(|| {
                AppError::Validation("amount es obligatorio en modo fijo".to_string())
            })?;
            if amount <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "amount debe ser mayor que cero".to_string(),
                ));
            }
            amount
        };

        let description = req
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&concept)
            .to_string();
        let kind = req.kind.as_deref().map(str::trim).unwrap_or("MENSUAL");
        let category = req.category.as_deref().map(str::trim).unwrap_or("CUOTA");

        let condominium = DirectoryService::find_condominium(pool, req.condominium_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Condominio no encontrado".to_string()))?;

        let mut tx = pool.begin().await?;

        // Unidades elegibles: todas las de todas las torres, ocupadas o no.
        let units: Vec<(i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT u.id, COALESCE(u.quota_share, 0)
            FROM units u
            JOIN towers t ON t.id = u.tower_id
            WHERE t.condominium_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(req.condominium_id)
        .fetch_all(&mut *tx)
        .await?;

        if units.is_empty() {
            return Ok(GenerateChargesResponse {
                units_considered: 0,
                debts_inserted: 0,
                quota_share_sum: req.prorate.then_some(Decimal::ZERO),
            });
        }

        let unit_ids: Vec<i64> = units.iter().map(|(id, _)| *id).collect();

        // Deudas previas del mismo concepto; el mes se compara sobre la
        // fecha ya interpretada, nunca sobre el texto crudo.
        let existing: Vec<(i64, Option<String>)> = sqlx::query_as(
            "SELECT unit_id, due_date FROM debts WHERE concept = $1 AND unit_id = ANY($2)",
        )
        .bind(&concept)
        .bind(&unit_ids)
        .fetch_all(&mut *tx)
        .await?;

        let already_charged: HashSet<i64> = existing
            .into_iter()
            .filter(|(_, due)| {
                due.as_deref()
                    .and_then(DueDate::parse)
                    .map(|parsed| parsed.month_start() == charge_month)
                    .unwrap_or(false)
            })
            .map(|(unit_id, _)| unit_id)
            .collect();

        let quotas: Vec<Decimal> = units.iter().map(|(_, quota)| *quota).collect();
        let amounts: Vec<Decimal> = if req.prorate {
            prorate_amounts(base_amount, &quotas)
        } else {
            vec![round_money(base_amount); units.len()]
        };
        let quota_share_sum = req.prorate.then(|| quotas.iter().copied().sum());

        let due_date_text = charge_month.format("%Y-%m").to_string();

        let mut inserted = 0usize;
        for ((unit_id, _), unit_amount) in units.iter().zip(&amounts) {
            if already_charged.contains(unit_id) {
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO debts
                    (concept, description, currency, amount, due_date,
                     is_active, is_delinquent, kind, category, unit_id)
                VALUES ($1, $2, $3, $4, $5, true, false, $6, $7, $8)
                "#,
            )
            .bind(&concept)
            .bind(&description)
            .bind(currency.as_str())
            .bind(unit_amount)
            .bind(&due_date_text)
            .bind(kind)
            .bind(category)
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;

        tracing::info!(
            "Generated {} charges for condominium '{}' ({} {})",
            inserted,
            condominium.name,
            concept,
            due_date_text
        );

        Ok(GenerateChargesResponse {
            units_considered: units.len(),
            debts_inserted: inserted,
            quota_share_sum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_prorate_two_units() {
        let amounts = prorate_amounts(dec!(100), &[dec!(0.6), dec!(0.4)]);
        assert_eq!(amounts, vec![dec!(60.00), dec!(40.00)]);
    }

    #[test]
    fn test_prorate_quotas_not_normalized() {
        // La proporción vale aunque las alícuotas no sumen 1.
        let amounts = prorate_amounts(dec!(100), &[dec!(3), dec!(1)]);
        assert_eq!(amounts, vec![dec!(75.00), dec!(25.00)]);
    }

    #[test]
    fn test_prorate_thirds_rounding() {
        let amounts = prorate_amounts(dec!(100), &[dec!(1), dec!(1), dec!(1)]);
        for amount in &amounts {
            assert_eq!(*amount, dec!(33.33));
        }
        let total: Decimal = amounts.iter().copied().sum();
        assert!((dec!(100) - total).abs() <= dec!(0.01));
    }

    #[test]
    fn test_prorate_zero_quota_sum() {
        let amounts = prorate_amounts(dec!(500), &[dec!(0), dec!(0)]);
        assert_eq!(amounts, vec![Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_prorate_empty() {
        assert!(prorate_amounts(dec!(500), &[]).is_empty());
    }

    #[test]
    fn test_prorate_rounds_half_away_from_zero() {
        // 66.67 / 2 = 33.335, el punto medio sube a 33.34.
        let amounts = prorate_amounts(dec!(66.67), &[dec!(1), dec!(1)]);
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.34)]);
    }
}
