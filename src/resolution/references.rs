//! In-memory currency reference table.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ReferenceSeries;
use crate::error::{EngineError, EngineResult};
use crate::models::{FxReferenceRequest, FxReferences, format_year_month, parse_year_month};

use super::ReferenceResolver;

/// UF, UTM and IMM series, sorted by date.
///
/// # Lookup rules
///
/// - **UF**: an explicit value wins and is reported with the requested date.
///   Otherwise the latest value on or before `uf_date`, or the latest value
///   known when no date is requested.
/// - **UTM**: an explicit value wins. Otherwise the value for `utm_month`, or
///   the latest earlier month, or the latest month known when no month is
///   requested.
/// - **IMM**: the minimum wage in force on the UF date, or the latest known
///   when no UF date applies.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    uf: Vec<(NaiveDate, Decimal)>,
    utm: Vec<(NaiveDate, Decimal)>,
    imm: Vec<(NaiveDate, Decimal)>,
}

impl ReferenceTable {
    /// Builds a table from the configured series.
    ///
    /// Fails when a UTM month is not `YYYY-MM` or any value is not positive.
    pub fn new(series: ReferenceSeries) -> EngineResult<Self> {
        let mut uf = Vec::with_capacity(series.uf.len());
        for entry in series.uf {
            ensure_positive("references.uf", entry.date, entry.value)?;
            uf.push((entry.date, entry.value));
        }

        let mut utm = Vec::with_capacity(series.utm.len());
        for entry in series.utm {
            let month = parse_year_month(&entry.month).ok_or_else(|| EngineError::ConfigParseError {
                path: "references.utm".to_string(),
                message: format!("'{}' is not a YYYY-MM month", entry.month),
            })?;
            ensure_positive("references.utm", month, entry.value)?;
            utm.push((month, entry.value));
        }

        let mut imm = Vec::with_capacity(series.imm.len());
        for entry in series.imm {
            ensure_positive("references.imm", entry.effective_from, entry.value)?;
            imm.push((entry.effective_from, entry.value));
        }

        uf.sort_by_key(|(date, _)| *date);
        utm.sort_by_key(|(month, _)| *month);
        imm.sort_by_key(|(date, _)| *date);

        Ok(Self { uf, utm, imm })
    }

    fn resolve_uf(
        &self,
        request: &FxReferenceRequest,
    ) -> EngineResult<(Decimal, Option<NaiveDate>)> {
        if let Some(value) = request.uf_value {
            return Ok((value, request.uf_date));
        }
        let (date, value) = match request.uf_date {
            Some(at) => latest_on_or_before(&self.uf, at)
                .ok_or_else(|| not_found("UF", at.to_string()))?,
            None => latest(&self.uf).ok_or_else(|| not_found("UF", "latest"))?,
        };
        debug!(requested = ?request.uf_date, %date, %value, "Resolved UF");
        Ok((value, Some(date)))
    }

    fn resolve_utm(&self, request: &FxReferenceRequest) -> EngineResult<(Decimal, Option<String>)> {
        if let Some(value) = request.utm_value {
            return Ok((value, request.utm_month.clone()));
        }
        let requested = match &request.utm_month {
            Some(month) => Some(parse_year_month(month).ok_or_else(|| {
                EngineError::invalid_input(
                    "utm_month",
                    format!("'{}' is not a YYYY-MM month", month),
                )
            })?),
            None => None,
        };
        let (month, value) = match requested {
            Some(at) => latest_on_or_before(&self.utm, at)
                .ok_or_else(|| not_found("UTM", format_year_month(at)))?,
            None => latest(&self.utm).ok_or_else(|| not_found("UTM", "latest"))?,
        };
        debug!(
            requested = ?request.utm_month,
            month = %format_year_month(month),
            %value,
            "Resolved UTM"
        );
        Ok((value, Some(format_year_month(month))))
    }

    fn resolve_imm(&self, on: Option<NaiveDate>) -> EngineResult<Decimal> {
        let (from, value) = match on {
            Some(at) => latest_on_or_before(&self.imm, at)
                .ok_or_else(|| not_found("IMM", at.to_string()))?,
            None => latest(&self.imm).ok_or_else(|| not_found("IMM", "latest"))?,
        };
        debug!(on = ?on, effective_from = %from, %value, "Resolved IMM");
        Ok(value)
    }
}

#[async_trait]
impl ReferenceResolver for ReferenceTable {
    async fn resolve_fx_references(
        &self,
        request: &FxReferenceRequest,
    ) -> EngineResult<FxReferences> {
        let (uf_clp, uf_date) = self.resolve_uf(request)?;
        let (utm_clp, utm_month) = self.resolve_utm(request)?;
        let imm_clp = self.resolve_imm(uf_date)?;

        Ok(FxReferences {
            uf_clp,
            uf_date,
            utm_clp,
            utm_month,
            imm_clp,
        })
    }
}

fn latest_on_or_before(
    series: &[(NaiveDate, Decimal)],
    at: NaiveDate,
) -> Option<(NaiveDate, Decimal)> {
    series.iter().rev().find(|(date, _)| *date <= at).copied()
}

fn latest(series: &[(NaiveDate, Decimal)]) -> Option<(NaiveDate, Decimal)> {
    series.last().copied()
}

fn not_found(reference: &str, at: impl Into<String>) -> EngineError {
    EngineError::ReferenceNotFound {
        reference: reference.to_string(),
        at: at.into(),
    }
}

fn ensure_positive(path: &str, at: NaiveDate, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::ConfigParseError {
            path: path.to_string(),
            message: format!("value {} for {} must be positive", value, at),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImmEntry, UfEntry, UtmEntry};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> ReferenceSeries {
        ReferenceSeries {
            uf: vec![
                UfEntry { date: date(2025, 1, 15), value: dec("38384.41") },
                UfEntry { date: date(2025, 1, 1), value: dec("38419.17") },
                UfEntry { date: date(2025, 7, 1), value: dec("39267.07") },
            ],
            utm: vec![
                UtmEntry { month: "2025-01".to_string(), value: dec("67429") },
                UtmEntry { month: "2025-02".to_string(), value: dec("67294") },
                UtmEntry { month: "2025-07".to_string(), value: dec("68923") },
            ],
            imm: vec![
                ImmEntry { effective_from: date(2024, 7, 1), value: dec("500000") },
                ImmEntry { effective_from: date(2025, 5, 1), value: dec("529000") },
            ],
        }
    }

    fn table() -> ReferenceTable {
        ReferenceTable::new(series()).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_to_latest_values() {
        let fx = table()
            .resolve_fx_references(&FxReferenceRequest::default())
            .await
            .unwrap();

        assert_eq!(fx.uf_clp, dec("39267.07"));
        assert_eq!(fx.uf_date, Some(date(2025, 7, 1)));
        assert_eq!(fx.utm_clp, dec("68923"));
        assert_eq!(fx.utm_month.as_deref(), Some("2025-07"));
        assert_eq!(fx.imm_clp, dec("529000"));
    }

    #[tokio::test]
    async fn test_uf_date_uses_latest_value_on_or_before() {
        let request = FxReferenceRequest {
            uf_date: Some(date(2025, 3, 10)),
            ..Default::default()
        };
        let fx = table().resolve_fx_references(&request).await.unwrap();

        assert_eq!(fx.uf_clp, dec("38384.41"));
        assert_eq!(fx.uf_date, Some(date(2025, 1, 15)));
        assert_eq!(fx.imm_clp, dec("500000"));
    }

    #[tokio::test]
    async fn test_explicit_values_pass_through() {
        let request = FxReferenceRequest {
            uf_value: Some(dec("37000")),
            uf_date: Some(date(2025, 1, 15)),
            utm_value: Some(dec("68000")),
            utm_month: None,
        };
        let fx = table().resolve_fx_references(&request).await.unwrap();

        assert_eq!(fx.uf_clp, dec("37000"));
        assert_eq!(fx.uf_date, Some(date(2025, 1, 15)));
        assert_eq!(fx.utm_clp, dec("68000"));
        assert_eq!(fx.utm_month, None);
        assert_eq!(fx.imm_clp, dec("500000"));
    }

    #[tokio::test]
    async fn test_utm_month_falls_back_to_earlier_month() {
        let request = FxReferenceRequest {
            utm_month: Some("2025-05".to_string()),
            ..Default::default()
        };
        let fx = table().resolve_fx_references(&request).await.unwrap();

        assert_eq!(fx.utm_clp, dec("67294"));
        assert_eq!(fx.utm_month.as_deref(), Some("2025-02"));
    }

    #[tokio::test]
    async fn test_uf_date_before_series_is_not_found() {
        let request = FxReferenceRequest {
            uf_date: Some(date(2020, 1, 1)),
            ..Default::default()
        };

        match table().resolve_fx_references(&request).await {
            Err(EngineError::ReferenceNotFound { reference, at }) => {
                assert_eq!(reference, "UF");
                assert_eq!(at, "2020-01-01");
            }
            other => panic!("Expected ReferenceNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_series_is_not_found() {
        let table = ReferenceTable::new(ReferenceSeries::default()).unwrap();

        let result = table
            .resolve_fx_references(&FxReferenceRequest::default())
            .await;
        assert!(matches!(
            result,
            Err(EngineError::ReferenceNotFound { reference, .. }) if reference == "UF"
        ));
    }

    #[test]
    fn test_malformed_utm_month_is_rejected() {
        let mut series = series();
        series.utm[0].month = "January".to_string();

        match ReferenceTable::new(series) {
            Err(EngineError::ConfigParseError { path, .. }) => assert_eq!(path, "references.utm"),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_value_is_rejected() {
        let mut series = series();
        series.imm[1].value = Decimal::ZERO;

        assert!(matches!(
            ReferenceTable::new(series),
            Err(EngineError::ConfigParseError { path, .. }) if path == "references.imm"
        ));
    }
}
