//! Date-to-position scales.
//!
//! Both charts project calendar dates onto pixel coordinates: the linear
//! chart onto a horizontal axis, the radial chart onto a radius. The two
//! scales share the day-resolution linear mapping and differ only in the
//! output range they clamp to.

use chrono::{Datelike, NaiveDate};

use crate::models::dates::{days_between, DateRange};

/// Linear mapping from a date domain onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: DateRange,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: DateRange, range_start: f64, range_end: f64) -> Self {
        Self {
            domain,
            range_start,
            range_end,
        }
    }

    pub fn domain(&self) -> DateRange {
        self.domain
    }

    /// Project a date onto the range. Dates outside the domain clamp to
    /// the range ends.
    pub fn project(&self, date: NaiveDate) -> f64 {
        let total = self.domain.duration_days();
        if total == 0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let offset = days_between(self.domain.start, self.domain.clamp(date));
        let fraction = offset as f64 / total as f64;
        self.range_start + fraction * (self.range_end - self.range_start)
    }

    /// Inverse projection, mapping a pixel position back to a date.
    /// Positions outside the range clamp to the domain ends.
    pub fn unproject(&self, position: f64) -> NaiveDate {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain.start;
        }
        let fraction = ((position - self.range_start) / span).clamp(0.0, 1.0);
        let offset = (fraction * self.domain.duration_days() as f64).round() as i64;
        self.domain.start + chrono::Duration::days(offset)
    }

    /// Pick round year ticks for the domain, at most `max_ticks` of them.
    ///
    /// Steps come from a 1/2/5/10 ladder so labels land on years a reader
    /// expects, e.g. 1900, 1925, 1950.
    pub fn year_ticks(&self, max_ticks: usize) -> Vec<i32> {
        if max_ticks == 0 {
            return Vec::new();
        }
        let first = self.domain.start.year();
        let last = self.domain.end.year();
        let span = (last - first).max(0) as usize;

        const STEPS: [i32; 9] = [1, 2, 5, 10, 20, 25, 50, 100, 200];
        let step = STEPS
            .iter()
            .copied()
            .find(|&s| span / s as usize + 1 <= max_ticks)
            .unwrap_or(200);

        let mut ticks = Vec::new();
        let mut year = first - first.rem_euclid(step);
        if year < first {
            year += step;
        }
        while year <= last {
            ticks.push(year);
            year += step;
        }
        ticks
    }

    /// Project the start of a year onto the range.
    pub fn project_year(&self, year: i32) -> f64 {
        match NaiveDate::from_ymd_opt(year, 1, 1) {
            Some(date) => self.project(date),
            None => self.range_start,
        }
    }
}

/// Mapping from a date domain onto a radius interval.
///
/// The inner bound is the chart's center hole and stays above zero, so
/// the earliest dates render on a small circle instead of degenerating
/// into the center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialScale {
    scale: LinearScale,
}

impl RadialScale {
    pub fn new(domain: DateRange, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            scale: LinearScale::new(domain, inner_radius, outer_radius),
        }
    }

    pub fn domain(&self) -> DateRange {
        self.scale.domain()
    }

    pub fn inner_radius(&self) -> f64 {
        self.scale.range_start
    }

    pub fn outer_radius(&self) -> f64 {
        self.scale.range_end
    }

    /// Radius for a date, clamped into the ring.
    pub fn project(&self, date: NaiveDate) -> f64 {
        self.scale.project(date)
    }

    /// Date at a radius, for hit testing and the mouse grid readout.
    pub fn unproject(&self, radius: f64) -> NaiveDate {
        self.scale.unproject(radius)
    }

    pub fn year_ticks(&self, max_ticks: usize) -> Vec<i32> {
        self.scale.year_ticks(max_ticks)
    }

    pub fn project_year(&self, year: i32) -> f64 {
        self.scale.project_year(year)
    }
}

/// Marker sizing by relation count.
///
/// Linear over the count domain `[1, max_count]`, clamped into the
/// configured radius bounds. The domain maximum is taken over the whole
/// prepared batch so sizes stay comparable across subjects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerScale {
    min_radius: f64,
    max_radius: f64,
    max_count: usize,
}

impl MarkerScale {
    pub fn new(min_radius: f64, max_radius: f64, max_count: usize) -> Self {
        Self {
            min_radius,
            max_radius,
            max_count: max_count.max(1),
        }
    }

    pub fn project(&self, relation_count: usize) -> f64 {
        if self.max_count <= 1 {
            return self.min_radius;
        }
        let clamped = relation_count.clamp(1, self.max_count);
        let fraction = (clamped - 1) as f64 / (self.max_count - 1) as f64;
        self.min_radius + fraction * (self.max_radius - self.min_radius)
    }
}

/// Convert polar coordinates into screen coordinates.
///
/// Angles are measured clockwise from twelve o'clock, matching how the
/// radial chart lays out its slots.
pub fn polar_to_cartesian(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}
