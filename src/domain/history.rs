// Sliding sample window for trend charts
use crate::domain::telemetry::TelemetrySnapshot;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Fixed-capacity FIFO of scalar samples in arrival order. An empty buffer
/// means no sample has been seen yet; nothing is ever padded in.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Buffer with `value` appended and the oldest samples trimmed to fit
    pub fn append(mut self, value: f64) -> Self {
        self.push(value);
        self
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Per-channel trend history, appended once per snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryHistory {
    pub speed: HistoryBuffer,
    pub soc: HistoryBuffer,
}

impl TelemetryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            speed: HistoryBuffer::new(capacity),
            soc: HistoryBuffer::new(capacity),
        }
    }

    pub fn record(&mut self, snapshot: &TelemetrySnapshot) {
        self.speed.push(snapshot.speed_kmh);
        self.soc.push(snapshot.battery.soc_percent);
    }
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_last_capacity_values_in_order() {
        let buffer = (0..25).fold(HistoryBuffer::new(20), |buf, v| buf.append(v as f64));

        assert_eq!(buffer.len(), 20);
        let expected: Vec<f64> = (5..25).map(|v| v as f64).collect();
        assert_eq!(buffer.to_vec(), expected);
        assert_eq!(buffer.latest(), Some(24.0));
    }

    #[test]
    fn test_append_below_capacity_keeps_everything() {
        let buffer = HistoryBuffer::new(20).append(1.0).append(2.0);
        assert_eq!(buffer.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_new_buffer_is_empty_without_padding() {
        let buffer = HistoryBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(buffer.latest(), None);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let buffer = HistoryBuffer::new(usize::MAX).append(1.0);
        assert_eq!(buffer.capacity(), usize::MAX);
        assert_eq!(buffer.to_vec(), vec![1.0]);
    }

    #[test]
    fn test_zero_capacity_never_grows() {
        let buffer = HistoryBuffer::new(0).append(3.0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_history_records_speed_and_soc() {
        let mut history = TelemetryHistory::new(3);
        let mut snapshot = TelemetrySnapshot::default();
        for i in 0..5 {
            snapshot.speed_kmh = 10.0 * i as f64;
            snapshot.battery.soc_percent = 90.0 - i as f64;
            history.record(&snapshot);
        }

        assert_eq!(history.speed.to_vec(), vec![20.0, 30.0, 40.0]);
        assert_eq!(history.soc.to_vec(), vec![88.0, 87.0, 86.0]);
    }
}
