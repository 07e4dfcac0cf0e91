use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{
    CondominiumTotals, Currency, Debt, DebtTotalsRow, DebtTotalsView, Equivalents, ExchangeRate,
    MoneyTotals, OwnerSummaryResponse,
};
use crate::services::{DirectoryService, PaymentsService, RateService};
use crate::utils::money::round_money;

/// Suma deudas activas por moneda nativa. Monedas desconocidas en filas
/// legadas no aportan a ningún total.
pub fn accumulate_totals(rows: &[DebtTotalsRow], exclude_delinquent: bool) -> MoneyTotals {
    let mut totals = MoneyTotals::ZERO;

    for row in rows {
        if exclude_delinquent && row.is_delinquent {
            continue;
        }
        match Currency::parse(&row.currency) {
            Some(Currency::Usd) => totals.usd += row.amount,
            Some(Currency::Eur) => totals.eur += row.amount,
            Some(Currency::Bs) => totals.bs += row.amount,
            None => {}
        }
    }

    totals
}

/// Expresa los totales en cada moneda con la tasa vigente. Devuelve None
/// si no hay tasa registrada o si alguna tasa no es positiva.
pub fn convert_totals(totals: &MoneyTotals, rate: Option<&ExchangeRate>) -> Option<Equivalents> {
    let rate = rate?;
    if rate.usd_rate <= rust_decimal::Decimal::ZERO || rate.eur_rate <= rust_decimal::Decimal::ZERO
    {
        return None;
    }

    let total_bs = totals.bs + totals.usd * rate.usd_rate + totals.eur * rate.eur_rate;
    let total_usd =
        totals.usd + totals.bs / rate.usd_rate + totals.eur * rate.eur_rate / rate.usd_rate;
    let total_eur =
        totals.eur + totals.bs / rate.eur_rate + totals.usd * rate.usd_rate / rate.eur_rate;

    Some(Equivalents {
        total_bs: round_money(total_bs),
        total_usd: round_money(total_usd),
        total_eur: round_money(total_eur),
    })
}

/// Particiona los totales por condominio, ordenados por nombre.
pub fn accumulate_by_condominium(
    rows: &[DebtTotalsRow],
    exclude_delinquent: bool,
    rate: Option<&ExchangeRate>,
) -> Vec<CondominiumTotals> {
    let mut partitions: BTreeMap<(String, i64), MoneyTotals> = BTreeMap::new();

    for row in rows {
        if exclude_delinquent && row.is_delinquent {
            continue;
        }
        let entry = partitions
            .entry((row.condominium_name.clone(), row.condominium_id))
            .or_insert(MoneyTotals::ZERO);
        match Currency::parse(&row.currency) {
            Some(Currency::Usd) => entry.usd += row.amount,
            Some(Currency::Eur) => entry.eur += row.amount,
            Some(Currency::Bs) => entry.bs += row.amount,
            None => {}
        }
    }

    partitions
        .into_iter()
        .map(|((condominium_name, condominium_id), totals)| CondominiumTotals {
            condominium_id,
            condominium_name,
            equivalents: convert_totals(&totals, rate),
            totals,
        })
        .collect()
}

fn build_totals_view(
    rows: &[DebtTotalsRow],
    exclude_delinquent: bool,
    rate: Option<&ExchangeRate>,
) -> DebtTotalsView {
    let totals = accumulate_totals(rows, exclude_delinquent);
    DebtTotalsView {
        equivalents: convert_totals(&totals, rate),
        by_condominium: accumulate_by_condominium(rows, exclude_delinquent, rate),
        totals,
    }
}

/// Resumen financiero del propietario: unidades, deudas, historial y
/// totales agregados en ambas variantes.
pub struct SummaryService;

impl SummaryService {
    pub async fn owner_summary_by_user(
        pool: &PgPool,
        user_id: i64,
    ) -> AppResult<OwnerSummaryResponse> {
        let owner = DirectoryService::find_owner_by_user(pool, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Propietario no encontrado para el usuario".to_string())
            })?;

        let units = DirectoryService::find_units_by_owner(pool, owner.id).await?;
        let unit_ids: Vec<i64> = units.iter().map(|unit| unit.id).collect();

        let (active_debts, totals_rows) = if unit_ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let debts = sqlx::query_as::<_, Debt>(
                r#"
                SELECT * FROM debts
                WHERE unit_id = ANY($1) AND is_active = true
                ORDER BY id
                "#,
            )
            .bind(&unit_ids)
            .fetch_all(pool)
            .await?;

            let rows = sqlx::query_as::<_, DebtTotalsRow>(
                r#"
                SELECT d.currency, d.amount, d.is_delinquent,
                       c.id AS condominium_id, c.name AS condominium_name
                FROM debts d
                JOIN units u ON u.id = d.unit_id
                JOIN condominiums c ON c.id = u.condominium_id
                WHERE d.unit_id = ANY($1) AND d.is_active = true
                "#,
            )
            .bind(&unit_ids)
            .fetch_all(pool)
            .await?;

            (debts, rows)
        };

        let current_rate = RateService::latest_rate(pool).await?;

        let email: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        let movements = match email {
            Some((email,)) => PaymentsService::history_for_holder(pool, &email, None, 200).await?,
            None => Vec::new(),
        };

        Ok(OwnerSummaryResponse {
            totals: build_totals_view(&totals_rows, false, current_rate.as_ref()),
            totals_excluding_delinquent: build_totals_view(
                &totals_rows,
                true,
                current_rate.as_ref(),
            ),
            owner,
            units,
            active_debts,
            movements,
            current_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn row(currency: &str, amount: Decimal, delinquent: bool, condo: (i64, &str)) -> DebtTotalsRow {
        DebtTotalsRow {
            currency: currency.to_string(),
            amount,
            is_delinquent: delinquent,
            condominium_id: condo.0,
            condominium_name: condo.1.to_string(),
        }
    }

    fn rate(usd: Decimal, eur: Decimal) -> ExchangeRate {
        ExchangeRate {
            id: 1,
            usd_rate: usd,
            eur_rate: eur,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_accumulate_buckets_by_currency() {
        let rows = vec![
            row("USD", dec!(100), false, (1, "Altamira")),
            row("EUR", dec!(50), false, (1, "Altamira")),
            row("BS", dec!(3650), false, (1, "Altamira")),
            row("USD", dec!(25.50), false, (1, "Altamira")),
        ];
        let totals = accumulate_totals(&rows, false);

        assert_eq!(totals.usd, dec!(125.50));
        assert_eq!(totals.eur, dec!(50));
        assert_eq!(totals.bs, dec!(3650));
    }

    #[test]
    fn test_accumulate_ignores_unknown_currency() {
        let rows = vec![
            row("USD", dec!(10), false, (1, "Altamira")),
            row("PETRO", dec!(9999), false, (1, "Altamira")),
            row("", dec!(500), false, (1, "Altamira")),
        ];
        let totals = accumulate_totals(&rows, false);

        assert_eq!(totals.usd, dec!(10));
        assert_eq!(totals.eur, Decimal::ZERO);
        assert_eq!(totals.bs, Decimal::ZERO);
    }

    #[test]
    fn test_accumulate_excluding_delinquent() {
        let rows = vec![
            row("USD", dec!(100), false, (1, "Altamira")),
            row("USD", dec!(40), true, (1, "Altamira")),
        ];

        assert_eq!(accumulate_totals(&rows, false).usd, dec!(140));
        assert_eq!(accumulate_totals(&rows, true).usd, dec!(100));
    }

    #[test]
    fn test_convert_totals_formulas() {
        let totals = MoneyTotals {
            usd: dec!(100),
            eur: dec!(50),
            bs: dec!(3650),
        };
        let rate = rate(dec!(36.5), dec!(40));

        let eq = convert_totals(&totals, Some(&rate)).unwrap();
        assert_eq!(eq.total_bs, dec!(9300.00));
        assert_eq!(eq.total_usd, dec!(254.79));
        assert_eq!(eq.total_eur, dec!(232.50));
    }

    #[test]
    fn test_convert_totals_without_rate() {
        let totals = MoneyTotals {
            usd: dec!(10),
            eur: Decimal::ZERO,
            bs: Decimal::ZERO,
        };
        assert!(convert_totals(&totals, None).is_none());
    }

    #[test]
    fn test_convert_totals_with_non_positive_rate() {
        let totals = MoneyTotals {
            usd: dec!(10),
            eur: Decimal::ZERO,
            bs: Decimal::ZERO,
        };
        assert!(convert_totals(&totals, Some(&rate(Decimal::ZERO, dec!(40)))).is_none());
        assert!(convert_totals(&totals, Some(&rate(dec!(36.5), dec!(-1)))).is_none());
    }

    #[test]
    fn test_partition_by_condominium_sorted_by_name() {
        let rows = vec![
            row("USD", dec!(10), false, (2, "Zafiro")),
            row("USD", dec!(20), false, (1, "Altamira")),
            row("BS", dec!(100), false, (2, "Zafiro")),
        ];
        let partitions = accumulate_by_condominium(&rows, false, None);

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].condominium_name, "Altamira");
        assert_eq!(partitions[0].totals.usd, dec!(20));
        assert_eq!(partitions[1].condominium_name, "Zafiro");
        assert_eq!(partitions[1].totals.usd, dec!(10));
        assert_eq!(partitions[1].totals.bs, dec!(100));
        assert!(partitions[0].equivalents.is_none());
    }

    #[test]
    fn test_partition_respects_delinquent_filter() {
        let rows = vec![
            row("USD", dec!(10), true, (1, "Altamira")),
            row("USD", dec!(5), false, (1, "Altamira")),
        ];
        let partitions = accumulate_by_condominium(&rows, true, None);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].totals.usd, dec!(5));
    }
}
