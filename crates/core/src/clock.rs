use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Source of "now" for one orchestration cycle.
///
/// The orchestrator reads the clock exactly once per cycle and threads that
/// instant through every computation, so decay, action ids and the report
/// date all agree with each other.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Generates action ids for a single cycle: `<prefix>_<unix_ms>_<cycle>_<seq>`.
///
/// The cycle number keeps ids distinct when two cycles read the same instant.
#[derive(Debug)]
pub struct ActionIdGen {
    millis: i64,
    cycle: u64,
    seq: u32,
}

impl ActionIdGen {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::for_cycle(now, 0)
    }

    pub fn for_cycle(now: DateTime<Utc>, cycle: u64) -> Self {
        Self {
            millis: now.timestamp_millis(),
            cycle,
            seq: 0,
        }
    }

    pub fn next(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{}_{}_{}_{}", prefix, self.millis, self.cycle, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(chrono::Duration::hours(2));
        assert_eq!(clock.now(), start + chrono::Duration::hours(2));
    }

    #[test]
    fn test_action_ids_are_unique_within_cycle() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut ids = ActionIdGen::new(now);
        let a = ids.next("fin");
        let b = ids.next("fin");
        assert_ne!(a, b);
        assert!(a.starts_with(&format!("fin_{}_", now.timestamp_millis())));
    }

    #[test]
    fn test_action_ids_differ_across_cycles_at_same_instant() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let first = ActionIdGen::for_cycle(now, 1).next("dec");
        let second = ActionIdGen::for_cycle(now, 2).next("dec");
        assert_ne!(first, second);
        assert_eq!(first, format!("dec_{}_1_1", now.timestamp_millis()));
    }
}
