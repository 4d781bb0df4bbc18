//! # Soft start
//!
//! The servos are held at their initial position for a warm-up period after power is applied,
//! before any control ticks are run. The warm-up is a deadline checked once per tick rather than
//! a blocking wait.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Progress of the soft start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftStartStatus {
    /// Still warming up, normal operation must not begin yet
    WarmingUp,

    /// The warm-up finished on this poll
    JustCompleted,

    /// The warm-up finished on an earlier poll
    Complete,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One-shot warm-up phase, timed from its first poll.
#[derive(Debug, Clone)]
pub struct SoftStart {
    duration_ms: u64,

    deadline_ms: Option<u64>,

    complete: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SoftStart {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            deadline_ms: None,
            complete: false,
        }
    }

    pub fn poll(&mut self, now_ms: u64) -> SoftStartStatus {
        if self.complete {
            return SoftStartStatus::Complete;
        }

        let deadline_ms = match self.deadline_ms {
            Some(d) => d,
            None => {
                let d = now_ms.saturating_add(self.duration_ms);
                info!("Soft start for {} ms", self.duration_ms);
                self.deadline_ms = Some(d);
                d
            }
        };

        if now_ms >= deadline_ms {
            self.complete = true;
            info!("Soft start complete");
            SoftStartStatus::JustCompleted
        } else {
            SoftStartStatus::WarmingUp
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_warm_up() {
        let mut s = SoftStart::new(1000);

        assert_eq!(s.poll(200), SoftStartStatus::WarmingUp);
        assert_eq!(s.poll(1199), SoftStartStatus::WarmingUp);
        assert!(!s.is_complete());
        assert_eq!(s.poll(1200), SoftStartStatus::JustCompleted);
        assert_eq!(s.poll(1201), SoftStartStatus::Complete);
        assert!(s.is_complete());
    }

    #[test]
    fn test_zero_duration() {
        let mut s = SoftStart::new(0);
        assert_eq!(s.poll(5), SoftStartStatus::JustCompleted);
    }
}
