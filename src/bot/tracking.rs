use std::fmt;

use chrono::{Duration, NaiveDate, Utc};

use super::config::TrackingConfig;

/* Tracking resolves the reporting window a payout run is attributed to.
 * Periods are consecutive windows of a fixed number of days, counted from an
 * anchor date. The period is used for display only.
 */

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Tracking period is not configured")]
    NotConfigured,
    #[error("Tracking period length must be at least one day")]
    ZeroLength,
    #[error("Current date {0} is before the tracking anchor")]
    BeforeAnchor(NaiveDate),
    #[error("Tracking period of {0} days is out of the supported date range")]
    OutOfRange(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for TrackingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

pub trait TrackingPeriodResolver: Send + Sync {
    fn current_period(&self) -> Result<TrackingPeriod, TrackingError>;
}

#[derive(Debug, Clone)]
pub struct ConfiguredTracking {
    config: Option<TrackingConfig>,
}

impl ConfiguredTracking {
    pub fn new(config: Option<TrackingConfig>) -> ConfiguredTracking {
        ConfiguredTracking { config }
    }
}

impl TrackingPeriodResolver for ConfiguredTracking {
    fn current_period(&self) -> Result<TrackingPeriod, TrackingError> {
        let config = self.config.as_ref().ok_or(TrackingError::NotConfigured)?;
        let today = Utc::now().with_timezone(&config.time_zone).date_naive();
        period_containing(config.anchor, config.length_days, today)
    }
}

// Finds the period of the given length, counted from anchor, that contains the date.
pub fn period_containing(
    anchor: NaiveDate,
    length_days: u32,
    date: NaiveDate,
) -> Result<TrackingPeriod, TrackingError> {
    if length_days == 0 {
        return Err(TrackingError::ZeroLength);
    }
    if date < anchor {
        return Err(TrackingError::BeforeAnchor(date));
    }

    let length = i64::from(length_days);
    let elapsed = (date - anchor).num_days() / length;
    let start = anchor
        .checked_add_signed(Duration::days(elapsed * length))
        .ok_or(TrackingError::OutOfRange(length_days))?;
    let end = start
        .checked_add_signed(Duration::days(length - 1))
        .ok_or(TrackingError::OutOfRange(length_days))?;

    Ok(TrackingPeriod { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_containing_anchor() {
        let period = period_containing(date(2024, 1, 1), 7, date(2024, 1, 1)).unwrap();
        assert_eq!(period.start, date(2024, 1, 1));
        assert_eq!(period.end, date(2024, 1, 7));
    }

    #[test]
    fn test_period_containing_later_window() {
        let period = period_containing(date(2024, 1, 1), 7, date(2024, 1, 17)).unwrap();
        assert_eq!(period.start, date(2024, 1, 15));
        assert_eq!(period.end, date(2024, 1, 21));

        // Last day of a window stays in that window
        let period = period_containing(date(2024, 1, 1), 7, date(2024, 1, 21)).unwrap();
        assert_eq!(period.start, date(2024, 1, 15));
    }

    #[test]
    fn test_period_errors() {
        assert_eq!(
            period_containing(date(2024, 1, 1), 0, date(2024, 2, 1)),
            Err(TrackingError::ZeroLength)
        );
        assert_eq!(
            period_containing(date(2024, 1, 1), 7, date(2023, 12, 31)),
            Err(TrackingError::BeforeAnchor(date(2023, 12, 31)))
        );
        assert_eq!(
            ConfiguredTracking::new(None).current_period(),
            Err(TrackingError::NotConfigured)
        );
    }

    #[test]
    fn test_huge_period_is_out_of_range() {
        assert_eq!(
            period_containing(date(2024, 1, 1), 4_000_000_000, date(2024, 2, 1)),
            Err(TrackingError::OutOfRange(4_000_000_000))
        );

        let tracking = ConfiguredTracking::new(Some(TrackingConfig {
            anchor: date(2000, 1, 3),
            length_days: u32::MAX,
            time_zone: chrono_tz::Tz::UTC,
        }));
        assert_eq!(
            tracking.current_period(),
            Err(TrackingError::OutOfRange(u32::MAX))
        );
    }

    #[test]
    fn test_configured_tracking_contains_today() {
        let tracking = ConfiguredTracking::new(Some(TrackingConfig {
            anchor: date(2000, 1, 3),
            length_days: 7,
            time_zone: chrono_tz::Tz::UTC,
        }));
        let today = Utc::now().date_naive();
        let period = tracking.current_period().unwrap();
        assert!(period.start <= today && today <= period.end);
        assert_eq!((period.end - period.start).num_days(), 6);
    }

    #[test]
    fn test_display_period() {
        let period = TrackingPeriod {
            start: date(2024, 3, 4),
            end: date(2024, 3, 10),
        };
        assert_eq!(period.to_string(), "2024-03-04 - 2024-03-10");
    }
}
