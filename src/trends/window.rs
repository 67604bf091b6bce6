//! Time-window filtering
//!
//! Narrows a trend series to the lookback period selected on the trend view.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use super::TrendError;
use crate::models::StockTrendRecord;

/// Lookback period for the trend view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    #[default]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "all")]
    All,
}

impl TimeWindow {
    /// Short name used on the wire and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::All => "all",
        }
    }

    /// Length of the lookback period, `None` for `all`
    pub fn lookback(&self) -> Option<ChronoDuration> {
        match self {
            Self::Last24Hours => Some(ChronoDuration::hours(24)),
            Self::Last7Days => Some(ChronoDuration::days(7)),
            Self::Last30Days => Some(ChronoDuration::days(30)),
            Self::Last90Days => Some(ChronoDuration::days(90)),
            Self::All => None,
        }
    }

    /// Earliest excluded instant relative to `now`; records must be strictly after it
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback().map(|lookback| now - lookback)
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(Self::Last24Hours),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "all" => Ok(Self::All),
            _ => Err(TrendError::InvalidWindow(s.to_string())),
        }
    }
}

/// Keep the records observed after `now - window`
///
/// `All` returns the input unchanged. Order is preserved.
pub fn filter_records(
    records: &[StockTrendRecord],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<StockTrendRecord> {
    match window.cutoff(now) {
        Some(cutoff) => records
            .iter()
            .filter(|r| r.date > cutoff)
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    /// Ten records one day apart, the last one at `now`
    fn daily_records() -> Vec<StockTrendRecord> {
        (0..10)
            .rev()
            .map(|days_back| {
                StockTrendRecord::new(now() - ChronoDuration::days(days_back), 100 - days_back, 5, 10)
            })
            .collect()
    }

    #[test]
    fn test_parse_windows() {
        assert_eq!("24h".parse::<TimeWindow>().unwrap(), TimeWindow::Last24Hours);
        assert_eq!("7D".parse::<TimeWindow>().unwrap(), TimeWindow::Last7Days);
        assert_eq!("30d".parse::<TimeWindow>().unwrap(), TimeWindow::Last30Days);
        assert_eq!("90d".parse::<TimeWindow>().unwrap(), TimeWindow::Last90Days);
        assert_eq!("all".parse::<TimeWindow>().unwrap(), TimeWindow::All);
        assert_eq!(
            "1y".parse::<TimeWindow>(),
            Err(TrendError::InvalidWindow("1y".to_string()))
        );
    }

    #[test]
    fn test_window_serialization() {
        assert_eq!(serde_json::to_string(&TimeWindow::Last7Days).unwrap(), "\"7d\"");
        let parsed: TimeWindow = serde_json::from_str("\"90d\"").unwrap();
        assert_eq!(parsed, TimeWindow::Last90Days);
    }

    #[test]
    fn test_seven_day_window_keeps_seven_most_recent() {
        let records = daily_records();
        let filtered = filter_records(&records, TimeWindow::Last7Days, now());

        assert_eq!(filtered.len(), 7);
        assert_eq!(filtered, records[3..].to_vec());
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let cutoff_record = StockTrendRecord::new(now() - ChronoDuration::hours(24), 1, 0, 0);
        let inside = StockTrendRecord::new(now() - ChronoDuration::hours(23), 1, 0, 0);

        let filtered = filter_records(&[cutoff_record, inside.clone()], TimeWindow::Last24Hours, now());
        assert_eq!(filtered, vec![inside]);
    }

    #[test]
    fn test_every_filtered_record_is_inside_window() {
        let records = daily_records();
        for window in [
            TimeWindow::Last24Hours,
            TimeWindow::Last7Days,
            TimeWindow::Last30Days,
            TimeWindow::Last90Days,
        ] {
            let cutoff = window.cutoff(now()).unwrap();
            let filtered = filter_records(&records, window, now());
            assert!(filtered.iter().all(|r| r.date > cutoff));
            let excluded = records.iter().filter(|r| r.date <= cutoff).count();
            assert_eq!(filtered.len() + excluded, records.len());
        }
    }

    #[test]
    fn test_all_passes_through() {
        let records = daily_records();
        assert_eq!(filter_records(&records, TimeWindow::All, now()), records);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_records(&[], TimeWindow::Last7Days, now()).is_empty());
        assert!(filter_records(&[], TimeWindow::All, now()).is_empty());
    }
}
