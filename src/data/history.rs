//! Rolling buffers for the telemetry and active-user streams.

use std::collections::VecDeque;
use std::time::Instant;

use trace_types::{ActiveUsersSample, TelemetryMetric, TelemetrySample};

/// Number of telemetry samples kept for charts.
pub const TELEMETRY_CAPACITY: usize = 100;

/// Number of active-user samples kept for charts.
pub const ACTIVE_USERS_CAPACITY: usize = 60;

/// A fixed-capacity FIFO buffer. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, evicting from the front until within capacity.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RollingBuffer<T> {
    /// Copy of the buffer contents, oldest first.
    pub fn values(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Recent telemetry and active-user samples.
///
/// Arrival instants are kept alongside the user samples so the dashboard can
/// show a rate of change without trusting backend timestamps.
#[derive(Debug, Clone)]
pub struct History {
    pub telemetry: RollingBuffer<TelemetrySample>,
    pub active_users: RollingBuffer<ActiveUsersSample>,
    user_arrivals: RollingBuffer<Instant>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacities(TELEMETRY_CAPACITY, ACTIVE_USERS_CAPACITY)
    }

    pub fn with_capacities(telemetry: usize, active_users: usize) -> Self {
        Self {
            telemetry: RollingBuffer::with_capacity(telemetry),
            active_users: RollingBuffer::with_capacity(active_users),
            user_arrivals: RollingBuffer::with_capacity(active_users),
        }
    }

    pub fn record_telemetry(&mut self, sample: TelemetrySample) {
        self.telemetry.push(sample);
    }

    /// Insert an older series ahead of whatever has already streamed in.
    ///
    /// Streamed samples stay newest; the oldest backfilled ones are dropped
    /// first when the combined length exceeds capacity. Returns the number
    /// of backfilled samples that were kept.
    pub fn backfill_telemetry(&mut self, series: Vec<TelemetrySample>) -> usize {
        let streamed = self.telemetry.values();
        let room = self.telemetry.capacity().saturating_sub(streamed.len());
        let skip = series.len().saturating_sub(room);

        self.telemetry.clear();
        let mut kept = 0;
        for sample in series.into_iter().skip(skip) {
            self.telemetry.push(sample);
            kept += 1;
        }
        for sample in streamed {
            self.telemetry.push(sample);
        }
        kept
    }

    pub fn record_active_users(&mut self, sample: ActiveUsersSample) {
        self.record_active_users_at(sample, Instant::now());
    }

    /// Record an active-user sample that arrived at `at`.
    pub fn record_active_users_at(&mut self, sample: ActiveUsersSample, at: Instant) {
        self.active_users.push(sample);
        self.user_arrivals.push(at);
    }

    /// Raw series for one metric, oldest first.
    pub fn series(&self, metric: TelemetryMetric) -> Vec<f64> {
        self.telemetry.iter().map(|s| s.value(metric)).collect()
    }

    /// Series for one metric scaled for ratatui's `Sparkline` (0-100 → 0-1000).
    pub fn sparkline(&self, metric: TelemetryMetric) -> Vec<u64> {
        self.telemetry
            .iter()
            .map(|s| (s.value(metric).max(0.0) * 10.0).round() as u64)
            .collect()
    }

    /// Active-user counts, oldest first.
    pub fn user_counts(&self) -> Vec<u64> {
        self.active_users.iter().map(|s| s.active_users).collect()
    }

    /// Trend levels (0-7) for the last `width` values of a metric.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn trend(&self, metric: TelemetryMetric, width: usize) -> Vec<u8> {
        let values = self.series(metric);
        let start = values.len().saturating_sub(width);
        normalize_levels(&values[start..])
    }

    /// Minimum, maximum and latest value of a metric.
    pub fn stats(&self, metric: TelemetryMetric) -> Option<(f64, f64, f64)> {
        let latest = self.telemetry.latest()?.value(metric);
        let (min, max) = self
            .telemetry
            .iter()
            .map(|s| s.value(metric))
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((min, max, latest))
    }

    /// Change in active users per second between the last two samples.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn user_rate(&self) -> Option<f64> {
        let n = self.active_users.len();
        if n < 2 || self.user_arrivals.len() < 2 {
            return None;
        }

        let mut users = self.active_users.iter().rev();
        let current = users.next()?.active_users as f64;
        let previous = users.next()?.active_users as f64;

        let mut arrivals = self.user_arrivals.iter().rev();
        let current_time = arrivals.next()?;
        let previous_time = arrivals.next()?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some((current - previous) / elapsed)
        } else {
            None
        }
    }
}

/// Normalize values to 0-7 for 8 bar levels.
fn normalize_levels(values: &[f64]) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let range = max - min;

    if range <= f64::EPSILON {
        return vec![3; values.len()];
    }

    values
        .iter()
        .map(|v| (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8)
        .collect()
}
