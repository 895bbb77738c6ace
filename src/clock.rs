use chrono::{DateTime, FixedOffset, Local, TimeZone};

/// Source of "now" for anything that stamps or windows by calendar day.
///
/// The instant carries its time zone, not just the current offset, so day
/// boundaries follow the zone's rules for that day.
pub trait Clock: Send + Sync {
    type Zone: TimeZone;

    fn now(&self) -> DateTime<Self::Zone>;
}

/// Wall-clock time in the machine's local zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Zone = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone = FixedOffset>(pub DateTime<Tz>);

impl<Tz> Clock for FixedClock<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    type Zone = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.0.clone()
    }
}
