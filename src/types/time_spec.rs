use std::{
    fmt,
    ops::{Add, Sub},
    time::Duration,
};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point on the device clock, in nanoseconds since the device time epoch.
///
/// Stored as an integer so offsets can be summed and compared exactly. Commands that
/// land on the same nanosecond are considered simultaneous.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpec {
    nanos: i64,
}

impl TimeSpec {
    /// The device time epoch.
    pub const ZERO: TimeSpec = TimeSpec { nanos: 0 };

    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// Converts fractional seconds into a [TimeSpec], rounding to the nearest nanosecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * NANOS_PER_SEC as f64).round() as i64,
        }
    }

    /// Builds a time from whole and fractional seconds, like `uhd::time_spec_t`.
    ///
    /// Saturates at the ends of the representable range.
    pub fn from_parts(full_secs: i64, frac_secs: f64) -> Self {
        let frac = (frac_secs * NANOS_PER_SEC as f64).round() as i64;
        Self {
            nanos: full_secs.saturating_mul(NANOS_PER_SEC).saturating_add(frac),
        }
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    pub const fn full_secs(&self) -> i64 {
        self.nanos.div_euclid(NANOS_PER_SEC)
    }

    pub fn frac_secs(&self) -> f64 {
        self.nanos.rem_euclid(NANOS_PER_SEC) as f64 / NANOS_PER_SEC as f64
    }

    /// `self + offset`, or `None` if the result does not fit the clock range.
    pub fn checked_add(&self, offset: Duration) -> Option<TimeSpec> {
        let offset = i64::try_from(offset.as_nanos()).ok()?;
        self.nanos.checked_add(offset).map(TimeSpec::from_nanos)
    }

    /// The time elapsed between `earlier` and `self`, or `None` if `earlier` is later.
    pub fn duration_since(&self, earlier: TimeSpec) -> Option<Duration> {
        let diff = self.nanos.checked_sub(earlier.nanos)?;
        u64::try_from(diff).ok().map(Duration::from_nanos)
    }
}

fn duration_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

impl Add<Duration> for TimeSpec {
    type Output = TimeSpec;

    fn add(self, rhs: Duration) -> TimeSpec {
        TimeSpec {
            nanos: self.nanos.saturating_add(duration_nanos(rhs)),
        }
    }
}

impl Sub<Duration> for TimeSpec {
    type Output = TimeSpec;

    fn sub(self, rhs: Duration) -> TimeSpec {
        TimeSpec {
            nanos: self.nanos.saturating_sub(duration_nanos(rhs)),
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.nanos < 0 { "-" } else { "" };
        let abs = self.nanos.unsigned_abs();
        f.write_fmt(format_args!(
            "{sign}{}.{:09}s",
            abs / NANOS_PER_SEC as u64,
            abs % NANOS_PER_SEC as u64
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_exact() {
        let t = TimeSpec::from_secs_f64(10.1);
        let end = t + Duration::from_secs_f64(0.05);
        assert_eq!(end, TimeSpec::from_secs_f64(10.15));
        assert_eq!(end.as_nanos(), 10_150_000_000);
    }

    #[test]
    fn parts() {
        let t = TimeSpec::from_parts(3, 0.25);
        assert_eq!(t.full_secs(), 3);
        assert_eq!(t.frac_secs(), 0.25);
        assert_eq!(t.to_string(), "3.250000000s");

        let neg = TimeSpec::from_secs_f64(-0.5);
        assert_eq!(neg.full_secs(), -1);
        assert_eq!(neg.frac_secs(), 0.5);
        assert_eq!(neg.to_string(), "-0.500000000s");
    }

    #[test]
    fn checked_add_stops_at_the_clock_range() {
        let t = TimeSpec::from_nanos(i64::MAX - 10);
        assert_eq!(
            t.checked_add(Duration::from_nanos(10)),
            Some(TimeSpec::from_nanos(i64::MAX))
        );
        assert_eq!(t.checked_add(Duration::from_nanos(11)), None);
        assert_eq!(TimeSpec::ZERO.checked_add(Duration::from_secs(u64::MAX)), None);
        // The saturating operator pins to the end instead
        assert_eq!(t + Duration::from_secs(1), TimeSpec::from_nanos(i64::MAX));
    }

    #[test]
    fn parts_saturate() {
        assert_eq!(TimeSpec::from_parts(i64::MAX, 0.5).as_nanos(), i64::MAX);
        assert_eq!(TimeSpec::from_parts(i64::MIN, 0.0).as_nanos(), i64::MIN);
    }

    #[test]
    fn duration_since() {
        let a = TimeSpec::from_secs_f64(1.0);
        let b = TimeSpec::from_secs_f64(1.5);
        assert_eq!(b.duration_since(a), Some(Duration::from_millis(500)));
        assert_eq!(a.duration_since(b), None);
    }
}
