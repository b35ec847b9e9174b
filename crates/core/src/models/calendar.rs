use chrono::{DateTime, Datelike, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A visible calendar window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parses RFC 3339 instants in any offset and precision.
    ///
    /// `2025-01-01T00:00:00Z` and `2025-01-01T01:00:00.000+01:00` yield the
    /// same range.
    pub fn parse(start: &str, end: &str) -> Result<Self, chrono::ParseError> {
        let start = DateTime::parse_from_rfc3339(start)?.with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339(end)?.with_timezone(&Utc);
        Ok(Self { start, end })
    }

    /// The calendar month containing `now`, from its first day to the first
    /// day of the following month.
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        let (year, month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        let end = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self { start, end }
    }

    /// The UTC day containing `now`.
    pub fn day_of(now: DateTime<Utc>) -> Self {
        let start = Utc
            .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Canonical text form used to decide whether two reports are the same window.
    pub fn normalized(&self) -> (String, String) {
        (iso_instant(self.start), iso_instant(self.end))
    }
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2025-01-01T00:00:00.000Z`.
pub fn iso_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
