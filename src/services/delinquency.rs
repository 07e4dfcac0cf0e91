use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{ClassifyDelinquencyRequest, ClassifyDelinquencyResponse, DueDate};

/// Decide el destino de cada deuda activa según su fecha límite
/// interpretada. Devuelve (a marcar, a desmarcar); las fechas ilegibles
/// no se tocan. Ambos conjuntos son disjuntos por construcción.
pub fn split_by_due_date(
    rows: &[(i64, Option<String>)],
    threshold: NaiveDate,
) -> (Vec<i64>, Vec<i64>) {
    let mut to_mark = Vec::new();
    let mut to_unmark = Vec::new();

    for (id, due) in rows {
        let parsed = match due.as_deref().and_then(DueDate::parse) {
            Some(parsed) => parsed,
            None => continue,
        };
        if parsed.due_on() <= threshold {
            to_mark.push(*id);
        } else {
            to_unmark.push(*id);
        }
    }

    (to_mark, to_unmark)
}

// Ambos UPDATE re-verifican sobre la versión vigente de la fila que la
// deuda siga activa: una deuda saldada entre la lectura de candidatas y
// la escritura conserva el estado en que la dejó la aprobación.
const MARK_DELINQUENT_SQL: &str = r#"
    UPDATE debts
    SET is_delinquent = true, updated_at = NOW()
    WHERE id = ANY($1) AND is_active = true AND is_delinquent = false
"#;

const CLEAR_DELINQUENT_SQL: &str = r#"
    UPDATE debts
    SET is_delinquent = false, updated_at = NOW()
    WHERE id = ANY($1) AND is_active = true AND is_delinquent = true
"#;

/// Reclasificación de morosidad por fecha de corte.
pub struct DelinquencyService;

impl DelinquencyService {
    /// Marca como morosa toda deuda activa vencida en o antes del umbral
    /// (corte menos días de gracia) y desmarca las que quedaron al día.
    /// Los contadores reportan solo filas que cambiaron de estado, así
    /// una segunda corrida idéntica devuelve ceros. Las deudas saldadas
    /// mientras corre la clasificación no se tocan.
    pub async fn classify_delinquency(
        pool: &PgPool,
        req: ClassifyDelinquencyRequest,
    ) -> AppResult<ClassifyDelinquencyResponse> {
        let grace_days = req.grace_days.unwrap_or(10);
        if grace_days < 0 {
            return Err(AppError::Validation(
                "grace_days no puede ser negativo".to_string(),
            ));
        }

        let cutoff = match req
            .cutoff_date
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::Validation("cutoff_date debe tener formato 'YYYY-MM-DD'".to_string())
            })?,
            None => Utc::now().date_naive(),
        };
        let threshold = Duration::try_days(grace_days)
            .and_then(|grace| cutoff.checked_sub_signed(grace))
            .ok_or_else(|| {
                AppError::Validation("grace_days excede el rango de fechas soportado".to_string())
            })?;

        let mut tx = pool.begin().await?;

        let rows: Vec<(i64, Option<String>)> = match req.condominium_id {
            Some(condominium_id) => {
                sqlx::query_as(
                    r#"
                    SELECT d.id, d.due_date
                    FROM debts d
                    JOIN units u ON u.id = d.unit_id
                    WHERE d.is_active = true AND u.condominium_id = $1
                    "#,
                )
                .bind(condominium_id)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as("SELECT id, due_date FROM debts WHERE is_active = true")
                    .fetch_all(&mut *tx)
                    .await?
            }
        };

        let (to_mark, to_unmark) = split_by_due_date(&rows, threshold);

        let marked = if to_mark.is_empty() {
            0
        } else {
            sqlx::query(MARK_DELINQUENT_SQL)
                .bind(&to_mark)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        };

        let unmarked = if to_unmark.is_empty() {
            0
        } else {
            sqlx::query(CLEAR_DELINQUENT_SQL)
                .bind(&to_unmark)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        };

        tx.commit().await?;

        tracing::info!(
            "Delinquency run with cutoff {} (threshold {}): {} marked, {} unmarked",
            cutoff,
            threshold,
            marked,
            unmarked
        );

        Ok(ClassifyDelinquencyResponse { marked, unmarked })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_split_marks_on_or_before_threshold() {
        let rows = vec![
            (1, Some("2024-05-01".to_string())),
            (2, Some("2024-05-15".to_string())),
            (3, Some("2024-05-16".to_string())),
        ];
        let (to_mark, to_unmark) = split_by_due_date(&rows, date(2024, 5, 15));

        assert_eq!(to_mark, vec![1, 2]);
        assert_eq!(to_unmark, vec![3]);
    }

    #[test]
    fn test_split_month_form_resolves_to_first_day() {
        // '2024-05' vence el 2024-05-01.
        let rows = vec![(7, Some("2024-05".to_string()))];

        let (to_mark, to_unmark) = split_by_due_date(&rows, date(2024, 5, 1));
        assert_eq!(to_mark, vec![7]);
        assert!(to_unmark.is_empty());

        let (to_mark, to_unmark) = split_by_due_date(&rows, date(2024, 4, 30));
        assert!(to_mark.is_empty());
        assert_eq!(to_unmark, vec![7]);
    }

    #[test]
    fn test_split_skips_unparseable_dates() {
        let rows = vec![
            (1, None),
            (2, Some("pendiente".to_string())),
            (3, Some("2024-06-01".to_string())),
        ];
        let (to_mark, to_unmark) = split_by_due_date(&rows, date(2024, 7, 1));

        assert_eq!(to_mark, vec![3]);
        assert!(to_unmark.is_empty());
    }

    #[test]
    fn test_split_sets_are_disjoint() {
        let rows: Vec<(i64, Option<String>)> = (1..=10)
            .map(|i| (i, Some(format!("2024-05-{:02}", i))))
            .collect();
        let (to_mark, to_unmark) = split_by_due_date(&rows, date(2024, 5, 5));

        for id in &to_mark {
            assert!(!to_unmark.contains(id));
        }
        assert_eq!(to_mark.len() + to_unmark.len(), rows.len());
    }

    #[test]
    fn test_flag_updates_skip_settled_debts() {
        // Una deuda saldada entre la lectura de candidatas y el UPDATE
        // debe quedar cerrada y no morosa: el predicado re-verifica
        // is_active sobre la versión vigente de la fila.
        for sql in [MARK_DELINQUENT_SQL, CLEAR_DELINQUENT_SQL] {
            assert!(sql.contains("is_active = true"));
        }
        assert!(MARK_DELINQUENT_SQL.contains("is_delinquent = false"));
        assert!(CLEAR_DELINQUENT_SQL.contains("is_delinquent = true"));
    }

    // Pool diferido sin conexión real: los errores de validación deben
    // salir antes de tocar la base.
    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/condopago")
            .unwrap()
    }

    #[tokio::test]
    async fn test_classify_rejects_oversized_grace_days() {
        for grace_days in [100_000_000, i64::MAX] {
            let req = ClassifyDelinquencyRequest {
                condominium_id: None,
                cutoff_date: Some("2024-05-15".to_string()),
                grace_days: Some(grace_days),
            };

            let err = DelinquencyService::classify_delinquency(&lazy_pool(), req)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_classify_rejects_negative_grace_days() {
        let req = ClassifyDelinquencyRequest {
            condominium_id: None,
            cutoff_date: None,
            grace_days: Some(-1),
        };

        let err = DelinquencyService::classify_delinquency(&lazy_pool(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
