//! Usage: Immutable filter value object shared by the chart and list fetches.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FilterParseError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1d")]
    LastDay,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl TimeRange {
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        match input {
            "all" => Ok(Self::All),
            "1d" => Ok(Self::LastDay),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            _ => Err(FilterParseError {
                field: "time_range",
                value: input.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::LastDay => "1d",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
        }
    }

    /// Inclusive lower timestamp bound, evaluated in UTC. `All` has none.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::All => return None,
            Self::LastDay => 1,
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
        };
        Some(now - Duration::days(days))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Error,
}

impl StatusFilter {
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        match input {
            "all" => Ok(Self::All),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => Err(FilterParseError {
                field: "status_filter",
                value: input.to_string(),
            }),
        }
    }

    pub fn matches(&self, status: Option<i64>) -> bool {
        match self {
            Self::All => true,
            Self::Success => matches!(status, Some(s) if (200..300).contains(&s)),
            Self::Error => matches!(status, Some(s) if s >= 400),
        }
    }
}

/// Filter shared by one fetch cycle. Immutable: a changed filter is a new
/// value, which starts a fresh cycle and invalidates in-flight results tied
/// to the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub time_range: TimeRange,
    pub status_filter: StatusFilter,
    pub search_query: String,
    pub limit: usize,
    pub offset: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            time_range: TimeRange::All,
            status_filter: StatusFilter::All,
            search_query: String::new(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl FilterSpec {
    /// Trimmed search term, or `None` when the query is blank.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search_query.trim();
        (!term.is_empty()).then_some(term)
    }

    /// A limit of zero falls back to the default page size.
    pub fn page_size(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_known_ranges_and_rejects_unknown() {
        assert_eq!(TimeRange::parse("all").unwrap(), TimeRange::All);
        assert_eq!(TimeRange::parse("7d").unwrap(), TimeRange::Last7Days);
        assert_eq!(StatusFilter::parse("error").unwrap(), StatusFilter::Error);

        let err = TimeRange::parse("14d").unwrap_err();
        assert_eq!(err.field, "time_range");
        assert_eq!(err.value, "14d");
        assert!(StatusFilter::parse("ok").is_err());
    }

    #[test]
    fn lower_bound_is_now_minus_days_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(TimeRange::All.lower_bound(now), None);
        assert_eq!(
            TimeRange::LastDay.lower_bound(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap())
        );
        assert_eq!(
            TimeRange::Last90Days.lower_bound(now),
            Some(now - Duration::days(90))
        );
    }

    #[test]
    fn status_filter_matching() {
        assert!(StatusFilter::All.matches(None));
        assert!(StatusFilter::Success.matches(Some(200)));
        assert!(!StatusFilter::Success.matches(Some(301)));
        assert!(!StatusFilter::Success.matches(None));
        assert!(StatusFilter::Error.matches(Some(500)));
        assert!(!StatusFilter::Error.matches(Some(204)));
    }

    #[test]
    fn blank_search_and_zero_limit_normalize() {
        let filter = FilterSpec {
            search_query: "   ".to_string(),
            limit: 0,
            ..Default::default()
        };
        assert_eq!(filter.search_term(), None);
        assert_eq!(filter.page_size(), DEFAULT_PAGE_SIZE);

        let filter = FilterSpec {
            search_query: " gpt-4 ".to_string(),
            limit: 25,
            ..Default::default()
        };
        assert_eq!(filter.search_term(), Some("gpt-4"));
        assert_eq!(filter.page_size(), 25);
    }
}
