use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Monedas que maneja el libro de deudas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Bs,
}

impl Currency {
    /// Interpreta el código de moneda almacenado como texto. Filas legadas
    /// pueden traer valores desconocidos; el agregador las ignora.
    pub fn parse(raw: &str) -> Option<Currency> {
        match raw.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "BS" => Some(Currency::Bs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Bs => "BS",
        }
    }
}

/// Fecha límite de una deuda. Se almacena como texto con dos formas
/// válidas: fecha exacta 'YYYY-MM-DD' o mes de cargo 'YYYY-MM'.
/// Se interpreta una sola vez al entrar al sistema, nunca en SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Exact(NaiveDate),
    /// Mes de cargo, resuelto al primer día del mes.
    Month(NaiveDate),
}

impl DueDate {
    pub fn parse(raw: &str) -> Option<DueDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(DueDate::Exact(date));
        }
        let (year, month) = raw.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1).map(DueDate::Month)
    }

    /// Fecha efectiva de vencimiento.
    pub fn due_on(self) -> NaiveDate {
        match self {
            DueDate::Exact(date) => date,
            DueDate::Month(first) => first,
        }
    }

    /// Primer día del mes al que pertenece el vencimiento.
    pub fn month_start(self) -> NaiveDate {
        match self {
            DueDate::Exact(date) => date.with_day(1).unwrap_or(date),
            DueDate::Month(first) => first,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Debt {
    pub id: i64,
    pub concept: String,
    pub description: Option<String>,
    /// Código de moneda tal como está almacenado ('USD', 'EUR', 'BS').
    pub currency: String,
    pub amount: Decimal,
    /// 'YYYY-MM-DD' o 'YYYY-MM'; ver [`DueDate`].
    pub due_date: Option<String>,
    pub is_active: bool,
    pub is_delinquent: bool,
    pub kind: String,
    pub category: String,
    pub unit_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateChargesRequest {
    pub condominium_id: i64,
    /// Mes de cargo: 'YYYY-MM' o 'YYYY-MM-DD' (se trunca al mes).
    pub month: String,
    pub concept: String,
    pub description: Option<String>,
    pub currency: String,
    /// true = distribuir `total_amount` por alícuota; false = `amount` fijo por unidad.
    #[serde(default)]
    pub prorate: bool,
    pub amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub kind: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateChargesResponse {
    pub units_considered: usize,
    pub debts_inserted: usize,
    /// Suma de alícuotas usada en el prorrateo, si aplica.
    pub quota_share_sum: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyDelinquencyRequest {
    pub condominium_id: Option<i64>,
    /// Fecha de corte 'YYYY-MM-DD'; por defecto hoy.
    pub cutoff_date: Option<String>,
    /// Días de gracia restados al corte; por defecto 10.
    pub grace_days: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassifyDelinquencyResponse {
    /// Deudas que pasaron a morosas en esta corrida.
    pub marked: u64,
    /// Deudas que dejaron de ser morosas en esta corrida.
    pub unmarked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("USD"), Some(Currency::Usd));
        assert_eq!(Currency::parse(" eur "), Some(Currency::Eur));
        assert_eq!(Currency::parse("bs"), Some(Currency::Bs));
        assert_eq!(Currency::parse("VES"), None);
        assert_eq!(Currency::parse(""), None);
    }

    #[test]
    fn test_due_date_parse_exact() {
        let parsed = DueDate::parse("2024-05-15");
        assert_eq!(
            parsed,
            Some(DueDate::Exact(
                NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
            ))
        );
        assert_eq!(
            parsed.unwrap().due_on(),
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
        );
        assert_eq!(
            parsed.unwrap().month_start(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_due_date_parse_month() {
        let parsed = DueDate::parse("2024-05");
        assert_eq!(
            parsed,
            Some(DueDate::Month(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        assert_eq!(
            parsed.unwrap().due_on(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_due_date_parse_invalid() {
        assert_eq!(DueDate::parse(""), None);
        assert_eq!(DueDate::parse("mayo 2024"), None);
        assert_eq!(DueDate::parse("2024-5"), None);
        assert_eq!(DueDate::parse("2024-13"), None);
        assert_eq!(DueDate::parse("2024-02-30"), None);
    }
}
