//! Bounded recent-events memo for duplicate suppression.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Process-local memo of "event key → time observed".
///
/// Purely a disposable cache: losing it costs at worst one duplicate
/// alert. Bounded in size, oldest entries evicted first.
pub struct DedupMemo {
    window: Duration,
    capacity: usize,
    seen: VecDeque<(String, Instant)>,
}

impl DedupMemo {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity,
            seen: VecDeque::with_capacity(capacity),
        }
    }

    /// Record an observation of `key` at `now`.
    ///
    /// Returns `true` if the key is fresh (not seen within the cooldown
    /// window) and the caller should proceed; `false` means duplicate,
    /// a deliberate no-op for the caller.
    pub fn observe(&mut self, key: &str, now: Instant) -> bool {
        while let Some((_, at)) = self.seen.front() {
            if now.duration_since(*at) > self.window {
                self.seen.pop_front();
            } else {
                break;
            }
        }

        if self.seen.iter().any(|(k, _)| k == key) {
            return false;
        }

        if self.seen.len() == self.capacity {
            self.seen.pop_front();
        }
        self.seen.push_back((key.to_string(), now));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_fresh() {
        // given:
        let mut memo = DedupMemo::new(Duration::from_secs(3), 16);
        let now = Instant::now();

        // when / then:
        assert!(memo.observe("message_received:order-1:1000", now));
    }

    #[test]
    fn test_duplicate_within_window_is_suppressed() {
        // given:
        let mut memo = DedupMemo::new(Duration::from_secs(3), 16);
        let now = Instant::now();
        assert!(memo.observe("evt", now));

        // when: the same key arrives over a second transport path
        let fresh = memo.observe("evt", now + Duration::from_millis(500));

        // then:
        assert!(!fresh);
    }

    #[test]
    fn test_key_is_fresh_again_after_window_expires() {
        // given:
        let mut memo = DedupMemo::new(Duration::from_secs(3), 16);
        let now = Instant::now();
        assert!(memo.observe("evt", now));

        // when:
        let fresh = memo.observe("evt", now + Duration::from_secs(4));

        // then:
        assert!(fresh);
    }

    #[test]
    fn test_capacity_evicts_oldest_entry() {
        // given: a memo of two slots filled with a and b
        let mut memo = DedupMemo::new(Duration::from_secs(60), 2);
        let now = Instant::now();
        assert!(memo.observe("a", now));
        assert!(memo.observe("b", now));

        // when: c evicts a
        assert!(memo.observe("c", now));

        // then: a is observable again, b and c remain suppressed
        assert!(memo.observe("a", now));
        assert!(!memo.observe("c", now));
    }
}
