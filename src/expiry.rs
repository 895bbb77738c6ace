//! Expiry window resolution for order drafts.
//!
//! An order is only executable inside `[executeFrom, executeTo]`. The window is
//! derived from the expiry mode picked on the order form:
//!
//! - `Today`: from the submit instant to 23:59:59 of the local day.
//! - `Never`: the whole local day, 00:00:00 to 23:59:59. The orders API has
//!   always received a same-day window for "never expire"; this is kept as is.
//! - `Period`: from the start of the first date to the start of the last date
//!   (or its 23:59:59 under [`PeriodEnd::EndOfDay`]). Dates are taken as UTC
//!   midnights, the way a bare `YYYY-MM-DD` reads as an ISO timestamp.
//!
//! A missing period date is not an error; that end of the window is left empty
//! and goes out on the wire as `""`.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// How long a submitted order stays executable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryMode {
    #[default]
    #[serde(rename = "T")]
    Today,
    #[serde(rename = "N")]
    Never,
    #[serde(rename = "P")]
    Period,
}

impl ExpiryMode {
    pub fn code(&self) -> &'static str {
        match self {
            ExpiryMode::Today => "T",
            ExpiryMode::Never => "N",
            ExpiryMode::Period => "P",
        }
    }
}

impl fmt::Display for ExpiryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpiryMode::Today => "Today",
            ExpiryMode::Never => "Never expire",
            ExpiryMode::Period => "Period",
        };
        f.write_str(label)
    }
}

impl FromStr for ExpiryMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "t" | "today" => Ok(ExpiryMode::Today),
            "n" | "never" => Ok(ExpiryMode::Never),
            "p" | "period" => Ok(ExpiryMode::Period),
            _ => Err(format!("unknown expiry mode: `{}`", s)),
        }
    }
}

/// Where the last day of a `Period` window is cut.
///
/// `StartOfDay` is what the orders API receives today, which excludes most of
/// the final day. `EndOfDay` extends it to 23:59:59 like the other modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodEnd {
    #[default]
    StartOfDay,
    EndOfDay,
}

impl FromStr for PeriodEnd {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "start-of-day" => Ok(PeriodEnd::StartOfDay),
            "end" | "end-of-day" => Ok(PeriodEnd::EndOfDay),
            _ => Err(format!("unknown period end: `{}`", s)),
        }
    }
}

/// The resolved `[executeFrom, executeTo]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub execute_from: Option<DateTime<Utc>>,
    pub execute_to: Option<DateTime<Utc>>,
}

impl ExpiryWindow {
    /// `executeFrom` as sent to the orders API.
    pub fn execute_from_wire(&self) -> String {
        wire(self.execute_from)
    }

    /// `executeTo` as sent to the orders API.
    pub fn execute_to_wire(&self) -> String {
        wire(self.execute_to)
    }
}

/// ISO-8601 in UTC with milliseconds, e.g. `2024-01-01T00:00:00.000Z`; empty when unset.
fn wire(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::default() + Duration::seconds(86_399)
}

/// `time` on the local calendar day of `now`, expressed in UTC.
///
/// The offset comes from the zone's rules on that day, not from `now`, so a
/// DST shift between midnight and `now` does not move the boundary.
fn on_local_day<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Utc> {
    let local = now.date_naive().and_time(time);
    let tz = now.timezone();
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        // skipped by a forward shift: read with the offset in force before it
        LocalResult::None => {
            let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
            (local - Duration::seconds(i64::from(before.local_minus_utc()))).and_utc()
        }
    }
}

fn on_utc_day(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Computes the execution window for `mode` as of `now`.
///
/// `period_from`/`period_to` are only read in `Period` mode.
pub fn resolve<Tz: TimeZone>(
    mode: ExpiryMode,
    period_from: Option<NaiveDate>,
    period_to: Option<NaiveDate>,
    now: DateTime<Tz>,
    period_end: PeriodEnd,
) -> ExpiryWindow {
    match mode {
        ExpiryMode::Today => ExpiryWindow {
            execute_from: Some(now.with_timezone(&Utc)),
            execute_to: Some(on_local_day(&now, end_of_day())),
        },
        ExpiryMode::Never => ExpiryWindow {
            execute_from: Some(on_local_day(&now, NaiveTime::default())),
            execute_to: Some(on_local_day(&now, end_of_day())),
        },
        ExpiryMode::Period => {
            let last_day = match period_end {
                PeriodEnd::StartOfDay => NaiveTime::default(),
                PeriodEnd::EndOfDay => end_of_day(),
            };
            ExpiryWindow {
                execute_from: period_from.map(|d| on_utc_day(d, NaiveTime::default())),
                execute_to: period_to.map(|d| on_utc_day(d, last_day)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};

    /// US Eastern with the 2024 rules: EDT from 2024-03-10 02:00 EST to
    /// 2024-11-03 02:00 EDT.
    #[derive(Debug, Clone, Copy)]
    struct Eastern2024;

    const EST: i32 = -5 * 3600;
    const EDT: i32 = -4 * 3600;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn offset(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).unwrap()
    }

    impl TimeZone for Eastern2024 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Eastern2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::default()))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            if *local < naive("2024-03-10 02:00") {
                LocalResult::Single(offset(EST))
            } else if *local < naive("2024-03-10 03:00") {
                LocalResult::None
            } else if *local < naive("2024-11-03 01:00") {
                LocalResult::Single(offset(EDT))
            } else if *local < naive("2024-11-03 02:00") {
                LocalResult::Ambiguous(offset(EDT), offset(EST))
            } else {
                LocalResult::Single(offset(EST))
            }
        }

        fn offset_from_utc_date(&self, utc_date: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc_date.and_time(NaiveTime::default()))
        }

        fn offset_from_utc_datetime(&self, at: &NaiveDateTime) -> FixedOffset {
            if *at >= naive("2024-03-10 07:00") && *at < naive("2024-11-03 06:00") {
                offset(EDT)
            } else {
                offset(EST)
            }
        }
    }

    fn eastern(local: &str) -> DateTime<Eastern2024> {
        Eastern2024
            .from_local_datetime(&naive(local))
            .single()
            .unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn today_runs_from_now_to_local_end_of_day() {
        let now = at("2024-05-14T10:20:30.250+02:00");
        let w = resolve(ExpiryMode::Today, None, None, now, PeriodEnd::default());

        assert_eq!(w.execute_from_wire(), "2024-05-14T08:20:30.250Z");
        assert_eq!(w.execute_to_wire(), "2024-05-14T21:59:59.000Z");

        let from = w.execute_from.unwrap().with_timezone(now.offset());
        let to = w.execute_to.unwrap().with_timezone(now.offset());
        assert_eq!(from.date_naive(), to.date_naive());
        assert_eq!(to.time(), end_of_day());
    }

    #[test]
    fn today_late_evening_stays_on_the_same_local_date() {
        // 23:30 local is already the next day in UTC
        let now = at("2024-05-14T23:30:00-04:00");
        let w = resolve(ExpiryMode::Today, None, None, now, PeriodEnd::default());

        let to = w.execute_to.unwrap().with_timezone(now.offset());
        assert_eq!(to.date_naive(), date("2024-05-14"));
        assert_eq!(w.execute_to_wire(), "2024-05-15T03:59:59.000Z");
    }

    #[test]
    fn never_spans_the_whole_local_day_whatever_the_hour() {
        for now in [
            at("2024-05-14T00:00:00+09:00"),
            at("2024-05-14T12:34:56+09:00"),
            at("2024-05-14T23:59:59+09:00"),
        ] {
            let w = resolve(ExpiryMode::Never, None, None, now, PeriodEnd::default());
            assert_eq!(w.execute_from_wire(), "2024-05-13T15:00:00.000Z");
            assert_eq!(w.execute_to_wire(), "2024-05-14T14:59:59.000Z");
        }
    }

    #[test]
    fn never_window_follows_zone_rules_on_spring_forward_day() {
        // 10:00 EDT; midnight that day was still EST
        let now = eastern("2024-03-10 10:00");
        let w = resolve(ExpiryMode::Never, None, None, now, PeriodEnd::default());
        assert_eq!(w.execute_from_wire(), "2024-03-10T05:00:00.000Z");
        assert_eq!(w.execute_to_wire(), "2024-03-11T03:59:59.000Z");
    }

    #[test]
    fn today_window_follows_zone_rules_on_fall_back_day() {
        // 00:30 EDT; the day ends in EST
        let now = eastern("2024-11-03 00:30");
        let w = resolve(ExpiryMode::Today, None, None, now, PeriodEnd::default());
        assert_eq!(w.execute_from_wire(), "2024-11-03T04:30:00.000Z");
        assert_eq!(w.execute_to_wire(), "2024-11-04T04:59:59.000Z");

        let never = resolve(ExpiryMode::Never, None, None, now, PeriodEnd::default());
        assert_eq!(never.execute_from_wire(), "2024-11-03T04:00:00.000Z");
    }

    #[test]
    fn period_uses_start_of_both_days_by_default() {
        let now = at("2024-05-14T10:00:00+00:00");
        let w = resolve(
            ExpiryMode::Period,
            Some(date("2024-01-01")),
            Some(date("2024-01-31")),
            now,
            PeriodEnd::StartOfDay,
        );
        assert_eq!(w.execute_from_wire(), "2024-01-01T00:00:00.000Z");
        assert_eq!(w.execute_to_wire(), "2024-01-31T00:00:00.000Z");
    }

    #[test]
    fn period_end_of_day_policy_extends_last_day() {
        let now = at("2024-05-14T10:00:00+00:00");
        let w = resolve(
            ExpiryMode::Period,
            Some(date("2024-01-01")),
            Some(date("2024-01-31")),
            now,
            PeriodEnd::EndOfDay,
        );
        assert_eq!(w.execute_from_wire(), "2024-01-01T00:00:00.000Z");
        assert_eq!(w.execute_to_wire(), "2024-01-31T23:59:59.000Z");
    }

    #[test]
    fn period_without_dates_leaves_window_empty() {
        let now = at("2024-05-14T10:00:00+00:00");
        let w = resolve(ExpiryMode::Period, None, None, now, PeriodEnd::default());
        assert_eq!(w.execute_from_wire(), "");
        assert_eq!(w.execute_to_wire(), "");

        let half = resolve(
            ExpiryMode::Period,
            Some(date("2024-02-29")),
            None,
            now,
            PeriodEnd::default(),
        );
        assert_eq!(half.execute_from_wire(), "2024-02-29T00:00:00.000Z");
        assert_eq!(half.execute_to_wire(), "");
    }

    #[test]
    fn non_period_modes_ignore_dates() {
        let now = at("2024-05-14T10:00:00+00:00");
        let with = resolve(
            ExpiryMode::Never,
            Some(date("2020-01-01")),
            Some(date("2020-01-02")),
            now,
            PeriodEnd::default(),
        );
        let without = resolve(ExpiryMode::Never, None, None, now, PeriodEnd::default());
        assert_eq!(with, without);
    }

    #[test]
    fn expiry_mode_parses_codes_and_names() {
        assert_eq!("T".parse::<ExpiryMode>().unwrap(), ExpiryMode::Today);
        assert_eq!("never".parse::<ExpiryMode>().unwrap(), ExpiryMode::Never);
        assert_eq!("Period".parse::<ExpiryMode>().unwrap(), ExpiryMode::Period);
        assert!("weekly".parse::<ExpiryMode>().is_err());
        assert_eq!(ExpiryMode::Never.to_string(), "Never expire");
    }
}
