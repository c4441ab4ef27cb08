use std::time::{SystemTime, UNIX_EPOCH};

/// Lamport logical clock. `observe` implements the standard rule:
/// `local = max(local, received) + 1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogicalClock(u64);

impl LogicalClock {
    pub fn new() -> Self {
        Self(0)
    }

    /// Advance the clock for a purely local event.
    pub fn tick(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Advance the clock on receipt of a message carrying `received`.
    pub fn observe(&mut self, received: u64) -> u64 {
        self.0 = self.0.max(received) + 1;
        self.0
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A wall clock that can be nudged by a Berkeley-style adjustment without
/// touching the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhysicalClock {
    offset_secs: f64,
}

impl PhysicalClock {
    pub fn new() -> Self {
        Self { offset_secs: 0.0 }
    }

    pub fn now(&self) -> f64 {
        unix_time_secs() + self.offset_secs
    }

    /// Apply a Berkeley adjustment delta (seconds, signed).
    pub fn adjust(&mut self, delta: f64) {
        self.offset_secs += delta;
    }

    pub fn offset(&self) -> f64 {
        self.offset_secs
    }
}

fn unix_time_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_clock_ticks_monotonically() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.get(), 2);
    }

    #[test]
    fn logical_clock_observes_max_plus_one() {
        let mut clock = LogicalClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.get(), 2);
        assert_eq!(clock.observe(10), 11);
        assert_eq!(clock.observe(3), 12);
    }

    #[test]
    fn physical_clock_offset_accumulates() {
        let mut clock = PhysicalClock::new();
        let before = clock.now();
        clock.adjust(5.0);
        assert!(clock.now() >= before + 5.0 - 0.01);
        clock.adjust(-2.0);
        assert_eq!(clock.offset(), 3.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Every clock value observed, local or received, is strictly
            // greater than any previously emitted or observed clock.
            #[test]
            fn observe_and_tick_are_strictly_increasing(received in proptest::collection::vec(0u64..10_000, 0..50)) {
                let mut clock = LogicalClock::new();
                let mut last = clock.get();
                for (i, value) in received.into_iter().enumerate() {
                    let next = if i % 2 == 0 { clock.tick() } else { clock.observe(value) };
                    prop_assert!(next > last);
                    last = next;
                }
            }

            #[test]
            fn observe_is_always_greater_than_the_received_value(received in 0u64..u64::MAX / 2) {
                let mut clock = LogicalClock::new();
                let next = clock.observe(received);
                prop_assert!(next > received);
            }
        }
    }
}
