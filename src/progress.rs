// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Live completion reporting.  Each partition owns one slot and is the
//! only writer to it; readers average the slots whenever they poll.
//! Slots are atomics holding the bits of an `f32`, so workers never
//! take a lock to report.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Reported while no partition has reported yet.
pub const NOT_STARTED: f32 = -1.0;

/// The progress slots of one render.
#[derive(Debug)]
pub struct ProgressSlots {
    slots: Vec<AtomicU32>,
    started: AtomicBool,
}

impl ProgressSlots {
    /// `count` slots, all at zero.
    pub fn new(count: usize) -> Self {
        ProgressSlots {
            slots: (0..count).map(|_| AtomicU32::new(0.0f32.to_bits())).collect(),
            started: AtomicBool::new(false),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Describes that there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record that partition `slot` is `fraction` done.  A slot never
    /// moves backwards: a smaller value than the one stored is ignored.
    pub fn report(&self, slot: usize, fraction: f32) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.max(0.0).min(1.0)
        };
        // Non-negative floats order the same way as their bit patterns.
        self.slots[slot].fetch_max(fraction.to_bits(), Ordering::Relaxed);
        self.started.store(true, Ordering::Release);
    }

    /// The progress of one slot.
    pub fn slot(&self, slot: usize) -> f32 {
        f32::from_bits(self.slots[slot].load(Ordering::Relaxed))
    }

    /// Mean progress across all slots, or `NOT_STARTED`.
    pub fn overall(&self) -> f32 {
        if !self.started.load(Ordering::Acquire) || self.slots.is_empty() {
            return NOT_STARTED;
        }
        let sum: f32 = (0..self.slots.len()).map(|i| self.slot(i)).sum();
        sum / self.slots.len() as f32
    }
}

/// The externally visible progress of whatever a plotter is rendering.
/// A fresh set of slots is installed at the start of each render and
/// stays readable after it ends.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    current: Mutex<Option<Arc<ProgressSlots>>>,
}

impl ProgressAggregator {
    /// An aggregator with no render behind it.
    pub fn new() -> Self {
        ProgressAggregator::default()
    }

    /// Start tracking a render split into `partitions` workers, and
    /// hand back the slots they report into.
    pub fn begin(&self, partitions: usize) -> Arc<ProgressSlots> {
        let slots = Arc::new(ProgressSlots::new(partitions));
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(slots.clone());
        slots
    }

    /// The overall completion of the current render in [0, 1], or
    /// `NOT_STARTED`.
    pub fn overall(&self) -> f32 {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match current {
            Some(slots) => slots.overall(),
            None => NOT_STARTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_started_until_first_report() {
        let aggregator = ProgressAggregator::new();
        assert_eq!(aggregator.overall(), NOT_STARTED);
        let slots = aggregator.begin(4);
        assert_eq!(aggregator.overall(), NOT_STARTED);
        slots.report(0, 0.0);
        assert_eq!(aggregator.overall(), 0.0);
    }

    #[test]
    fn overall_is_the_mean() {
        let slots = ProgressSlots::new(4);
        slots.report(0, 1.0);
        slots.report(1, 0.5);
        slots.report(2, 0.5);
        assert_eq!(slots.overall(), 0.5);
    }

    #[test]
    fn slots_never_go_backwards_and_are_clamped() {
        let slots = ProgressSlots::new(1);
        slots.report(0, 0.75);
        slots.report(0, 0.25);
        assert_eq!(slots.slot(0), 0.75);
        slots.report(0, 3.0);
        assert_eq!(slots.slot(0), 1.0);
        slots.report(0, std::f32::NAN);
        assert_eq!(slots.slot(0), 1.0);
    }

    #[test]
    fn begin_replaces_the_previous_render() {
        let aggregator = ProgressAggregator::new();
        aggregator.begin(1).report(0, 1.0);
        assert_eq!(aggregator.overall(), 1.0);
        aggregator.begin(2);
        assert_eq!(aggregator.overall(), NOT_STARTED);
    }

    #[test]
    fn concurrent_writers_keep_overall_monotone() {
        const WORKERS: usize = 4;
        const STEPS: usize = 500;
        let aggregator = ProgressAggregator::new();
        let slots = aggregator.begin(WORKERS);
        let readings = crossbeam::scope(|spawner| {
            for worker in 0..WORKERS {
                let slots = &slots;
                spawner.spawn(move |_| {
                    for step in 1..=STEPS {
                        slots.report(worker, step as f32 / STEPS as f32);
                    }
                });
            }
            let reader = spawner.spawn(|_| {
                let mut readings = vec![];
                loop {
                    let p = aggregator.overall();
                    readings.push(p);
                    if p >= 1.0 {
                        break readings;
                    }
                }
            });
            reader.join().unwrap()
        })
        .unwrap();
        assert!(readings.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(aggregator.overall(), 1.0);
    }
}
