use chrono::NaiveDate;

use crate::core::vessel::day_number;

/// Maps a continuous value domain onto a continuous pixel range.
///
/// Output is clamped to the range, so values outside the domain pin to the
/// nearest endpoint. A degenerate (zero-width) domain maps everything to
/// the middle of the range.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f32,
    r1: f32,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    /// Map a domain value to a pixel position
    pub fn map(&self, value: f64) -> f32 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return (self.r0 + self.r1) / 2.0;
        }
        let t = ((value - self.d0) / span).clamp(0.0, 1.0);
        self.r0 + (t as f32) * (self.r1 - self.r0)
    }

    /// Map a pixel position back to a domain value
    pub fn invert(&self, pixel: f32) -> f64 {
        let span = self.r1 - self.r0;
        if span == 0.0 {
            return (self.d0 + self.d1) / 2.0;
        }
        let t = (((pixel - self.r0) / span) as f64).clamp(0.0, 1.0);
        self.d0 + t * (self.d1 - self.d0)
    }
}

/// Calendar-time scale at day resolution.
///
/// Forward mapping positions event marks and the playback cursor; the
/// inverse mapping turns a scrub drop position back into a (fractional)
/// day number for nearest-date snapping.
#[derive(Debug, Clone, Copy)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(start: NaiveDate, end: NaiveDate, range: (f32, f32)) -> Self {
        Self {
            inner: LinearScale::new(
                (day_number(start) as f64, day_number(end) as f64),
                range,
            ),
        }
    }

    /// Pixel position of a calendar date
    pub fn map(&self, date: NaiveDate) -> f32 {
        self.inner.map(day_number(date) as f64)
    }

    /// Fractional day number at a pixel position, clamped to the domain
    pub fn invert_days(&self, pixel: f32) -> f64 {
        self.inner.invert(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_map_endpoints() {
        let s = LinearScale::new((0.0, 100.0), (0.0, 500.0));
        assert_eq!(s.map(0.0), 0.0);
        assert_eq!(s.map(100.0), 500.0);
        assert_eq!(s.map(50.0), 250.0);
    }

    #[test]
    fn test_linear_map_clamps_outside_domain() {
        let s = LinearScale::new((2.0, 1500.0), (880.0, 110.0));
        assert_eq!(s.map(1.0), 880.0);
        assert_eq!(s.map(5000.0), 110.0);
    }

    #[test]
    fn test_linear_invert_roundtrip() {
        let s = LinearScale::new((0.0, 400.0), (60.0, 860.0));
        for v in [0.0, 100.0, 256.0, 400.0] {
            let back = s.invert(s.map(v));
            assert!((back - v).abs() < 1e-3, "{} -> {}", v, back);
        }
    }

    #[test]
    fn test_linear_degenerate_domain() {
        let s = LinearScale::new((5.0, 5.0), (0.0, 100.0));
        assert_eq!(s.map(5.0), 50.0);
    }

    #[test]
    fn test_time_scale_maps_dates() {
        let start = NaiveDate::from_ymd_opt(1890, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(1890, 1, 11).unwrap();
        let s = TimeScale::new(start, end, (0.0, 100.0));
        assert_eq!(s.map(start), 0.0);
        assert_eq!(s.map(end), 100.0);
        let mid = NaiveDate::from_ymd_opt(1890, 1, 6).unwrap();
        assert_eq!(s.map(mid), 50.0);
    }

    #[test]
    fn test_time_scale_invert_hits_exact_day() {
        let start = NaiveDate::from_ymd_opt(1890, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(1890, 1, 11).unwrap();
        let s = TimeScale::new(start, end, (0.0, 100.0));
        let target = s.invert_days(50.0);
        let mid = NaiveDate::from_ymd_opt(1890, 1, 6).unwrap();
        assert!((target - day_number(mid) as f64).abs() < 1e-9);
    }
}
