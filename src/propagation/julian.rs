//! Julian date conversion.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Minutes in one day.
const MINUTES_PER_DAY: f64 = 1440.0;
/// Seconds in one day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// A Julian date split into a whole day (ending in `.5`) and a day fraction.
///
/// Keeping the two parts apart preserves sub-millisecond precision when
/// differences between dates are taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDate {
    /// Julian day number at the preceding midnight.
    pub day: f64,
    /// Fraction of the day elapsed since midnight, in `[0, 1)`.
    pub fraction: f64,
}

impl JulianDate {
    /// Converts a UTC calendar date-time.
    ///
    /// Same arithmetic as Vallado's `jday`, the routine the reference SGP4
    /// implementation uses to build its epochs. Valid for years 1900
    /// through 2100.
    #[must_use]
    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        let year = f64::from(datetime.year());
        let month = f64::from(datetime.month());
        let day = f64::from(datetime.day());

        let julian_day = 367.0 * year - (7.0 * (year + ((month + 9.0) / 12.0).floor()) * 0.25).floor()
            + (275.0 * month / 9.0).floor()
            + day
            + 1_721_013.5;

        let seconds = f64::from(datetime.num_seconds_from_midnight())
            + f64::from(datetime.nanosecond().min(999_999_999)) / 1e9;

        Self {
            day: julian_day,
            fraction: seconds / SECONDS_PER_DAY,
        }
    }

    /// Returns the Julian date as a single number.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.day + self.fraction
    }

    /// Returns the minutes elapsed from `earlier` to `self`.
    #[must_use]
    pub fn minutes_since(&self, earlier: &Self) -> f64 {
        ((self.day - earlier.day) + (self.fraction - earlier.fraction)) * MINUTES_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_micro_opt(h, mi, s, micros)
            .unwrap()
    }

    #[test]
    fn j2000_epoch() {
        let jd = JulianDate::from_datetime(&datetime(2000, 1, 1, 12, 0, 0, 0));
        assert!((jd.day - 2_451_544.5).abs() < f64::EPSILON);
        assert!((jd.fraction - 0.5).abs() < f64::EPSILON);
        assert!((jd.value() - 2_451_545.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sub_second_precision_is_kept() {
        let jd = JulianDate::from_datetime(&datetime(2008, 9, 20, 12, 25, 40, 104_192));
        assert!((jd.day - 2_454_729.5).abs() < f64::EPSILON);
        assert!((jd.fraction - 0.517_825_28).abs() < 1e-11);
    }

    #[test]
    fn minutes_between_dates() {
        let start = JulianDate::from_datetime(&datetime(2024, 2, 28, 23, 0, 0, 0));
        let end = JulianDate::from_datetime(&datetime(2024, 2, 29, 1, 30, 0, 0));
        assert!((end.minutes_since(&start) - 150.0).abs() < 1e-9);
        assert!((start.minutes_since(&end) + 150.0).abs() < 1e-9);
    }

    #[test]
    fn month_boundaries_are_continuous() {
        let jan31 = JulianDate::from_datetime(&datetime(2025, 1, 31, 0, 0, 0, 0));
        let feb1 = JulianDate::from_datetime(&datetime(2025, 2, 1, 0, 0, 0, 0));
        assert!((feb1.day - jan31.day - 1.0).abs() < f64::EPSILON);

        let dec31 = JulianDate::from_datetime(&datetime(2024, 12, 31, 0, 0, 0, 0));
        let jan1 = JulianDate::from_datetime(&datetime(2025, 1, 1, 0, 0, 0, 0));
        assert!((jan1.day - dec31.day - 1.0).abs() < f64::EPSILON);
    }
}
