use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{
    Currency, DashboardResponse, DebtAggregate, MoneyTotals, MovementStatus, PaymentsAggregate,
    TopDebtorRow,
};

/// Agrega filas (moneda, cantidad, suma) en un acumulado por moneda.
/// El conteo incluye todas las filas; monedas desconocidas no suman.
fn fold_currency_rows(rows: &[(String, i64, Decimal)]) -> (i64, MoneyTotals) {
    let mut count = 0;
    let mut totals = MoneyTotals::ZERO;

    for (currency, n, sum) in rows {
        count += n;
        match Currency::parse(currency) {
            Some(Currency::Usd) => totals.usd += *sum,
            Some(Currency::Eur) => totals.eur += *sum,
            Some(Currency::Bs) => totals.bs += *sum,
            None => {}
        }
    }

    (count, totals)
}

/// Tablero administrativo de lectura: deuda viva, morosidad y pagos
/// aprobados en un rango.
pub struct DashboardService;

impl DashboardService {
    pub async fn dashboard(
        pool: &PgPool,
        condominium_id: Option<i64>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<DashboardResponse> {
        let active_rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT d.currency, COUNT(*), COALESCE(SUM(d.amount), 0)
            FROM debts d
            JOIN units u ON u.id = d.unit_id
            WHERE d.is_active = true
              AND ($1::bigint IS NULL OR u.condominium_id = $1)
            GROUP BY d.currency
            "#,
        )
        .bind(condominium_id)
        .fetch_all(pool)
        .await?;

        let delinquent_rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT d.currency, COUNT(*), COALESCE(SUM(d.amount), 0)
            FROM debts d
            JOIN units u ON u.id = d.unit_id
            WHERE d.is_active = true
              AND d.is_delinquent = true
              AND ($1::bigint IS NULL OR u.condominium_id = $1)
            GROUP BY d.currency
            "#,
        )
        .bind(condominium_id)
        .fetch_all(pool)
        .await?;

        let payment_rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT m.currency, COUNT(*), COALESCE(SUM(m.amount), 0)
            FROM movements m
            JOIN receipts r ON r.movement_id = m.id
            JOIN debts d ON d.id = r.debt_id
            JOIN units u ON u.id = d.unit_id
            WHERE m.status = $4
              AND m.movement_date BETWEEN $2 AND $3
              AND ($1::bigint IS NULL OR u.condominium_id = $1)
            GROUP BY m.currency
            "#,
        )
        .bind(condominium_id)
        .bind(from)
        .bind(to)
        .bind(MovementStatus::Approved)
        .fetch_all(pool)
        .await?;

        let top_debtors = sqlx::query_as::<_, TopDebtorRow>(
            r#"
            SELECT u.id AS unit_id, u.name AS unit_name,
                   t.name AS tower_name, c.name AS condominium_name,
                   COUNT(*) AS debt_count,
                   COALESCE(SUM(d.amount) FILTER (WHERE d.currency = 'USD'), 0) AS total_usd,
                   COALESCE(SUM(d.amount) FILTER (WHERE d.currency = 'EUR'), 0) AS total_eur,
                   COALESCE(SUM(d.amount) FILTER (WHERE d.currency = 'BS'), 0) AS total_bs
            FROM debts d
            JOIN units u ON u.id = d.unit_id
            JOIN towers t ON t.id = u.tower_id
            JOIN condominiums c ON c.id = u.condominium_id
            WHERE d.is_active = true
              AND ($1::bigint IS NULL OR u.condominium_id = $1)
            GROUP BY u.id, u.name, t.name, c.name
            ORDER BY debt_count DESC, total_usd DESC
            LIMIT 10
            "#,
        )
        .bind(condominium_id)
        .fetch_all(pool)
        .await?;

        let (active_count, active_totals) = fold_currency_rows(&active_rows);
        let (delinquent_count, delinquent_totals) = fold_currency_rows(&delinquent_rows);
        let (payments_count, payments_totals) = fold_currency_rows(&payment_rows);

        Ok(DashboardResponse {
            active_debts: DebtAggregate {
                count: active_count,
                totals: active_totals,
            },
            delinquent_debts: DebtAggregate {
                count: delinquent_count,
                totals: delinquent_totals,
            },
            approved_payments: PaymentsAggregate {
                count: payments_count,
                totals: payments_totals,
                from,
                to,
            },
            top_debtors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fold_currency_rows() {
        let rows = vec![
            ("USD".to_string(), 3, dec!(120.50)),
            ("BS".to_string(), 2, dec!(7000)),
            ("PETRO".to_string(), 1, dec!(999)),
        ];
        let (count, totals) = fold_currency_rows(&rows);

        assert_eq!(count, 6);
        assert_eq!(totals.usd, dec!(120.50));
        assert_eq!(totals.bs, dec!(7000));
        assert_eq!(totals.eur, Decimal::ZERO);
    }
}
