use chrono::{Duration, NaiveDateTime, Timelike};

use crate::error::{PipelineError, Result};

/// Query format used by the chat-log service, e.g. `2025-07-15/22:31`.
pub const QUERY_FORMAT: &str = "%Y-%m-%d/%H:%M";
/// Human-readable format used in transcript headers.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A lookback window in local wall-clock time, at minute precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Window of `hours` ending at `now`. `now` is truncated to the minute so that the
    /// query string carries the exact same instants.
    ///
    /// Fails with [`PipelineError::InvalidArgument`] when the start would fall before
    /// the earliest representable date.
    pub fn lookback(now: NaiveDateTime, hours: u32) -> Result<Self> {
        let end = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        let start = Duration::try_hours(i64::from(hours))
            .and_then(|d| end.checked_sub_signed(d))
            .ok_or_else(|| {
                PipelineError::InvalidArgument(format!("lookback of {hours} hours is out of range"))
            })?;
        Ok(Self { start, end })
    }

    pub fn to_query(&self) -> String {
        format!(
            "{}~{}",
            self.start.format(QUERY_FORMAT),
            self.end.format(QUERY_FORMAT)
        )
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (a, b) = s
            .split_once('~')
            .ok_or_else(|| PipelineError::ParseFailure(format!("time range without '~': {s}")))?;
        let parse = |v: &str| {
            NaiveDateTime::parse_from_str(v, QUERY_FORMAT)
                .map_err(|e| PipelineError::ParseFailure(format!("bad timestamp {v:?}: {e}")))
        };
        Ok(Self {
            start: parse(a)?,
            end: parse(b)?,
        })
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 16)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn span_equals_requested_hours() {
        for hours in [0, 1, 24, 48, 24 * 365] {
            let r = TimeRange::lookback(at(22, 31, 47), hours).unwrap();
            assert_eq!(r.span(), Duration::hours(i64::from(hours)));
        }
    }

    #[test]
    fn query_matches_service_format() {
        let r = TimeRange::lookback(at(22, 31, 47), 24).unwrap();
        assert_eq!(r.to_query(), "2025-07-15/22:31~2025-07-16/22:31");
    }

    #[test]
    fn query_round_trips() {
        let r = TimeRange::lookback(at(3, 5, 59), 30).unwrap();
        assert_eq!(TimeRange::parse(&r.to_query()).unwrap(), r);
    }

    #[test]
    fn huge_lookback_is_an_error() {
        let err = TimeRange::lookback(at(22, 31, 0), u32::MAX).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(m) if m.contains("4294967295")));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(TimeRange::parse("2025-07-15/22:31").is_err());
        assert!(TimeRange::parse("a~b").is_err());
    }
}
