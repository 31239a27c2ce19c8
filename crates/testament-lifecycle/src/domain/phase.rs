//! # Execution Phases
//!
//! The phased-authorization rule. With `deadline = last_check_in +
//! check_in_period` and `dispute_end = deadline + dispute_period`:
//!
//! | Phase   | Condition                    | Who may execute          |
//! |---------|------------------------------|--------------------------|
//! | Locked  | `t <= deadline`              | nobody                   |
//! | Dispute | `deadline < t <= dispute_end`| guardian only            |
//! | Open    | `t > dispute_end`            | any listed beneficiary   |

use serde::{Deserialize, Serialize};

/// Where a will stands relative to its dead-man's-switch timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPhase {
    /// The testator is presumed alive; nobody may execute.
    Locked,
    /// The timer lapsed; only the guardian may execute.
    Dispute,
    /// The dispute window closed; any listed beneficiary may execute.
    Open,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Will;
    use testament_types::Address;

    fn will() -> Will {
        // last_check_in = 1000, check_in_period = 100, dispute_period = 50
        Will::new(Address::from_bytes([1u8; 20]), 100, 50, 1000)
    }

    #[test]
    fn test_locked_up_to_and_including_deadline() {
        let w = will();
        assert_eq!(w.phase(1000), ExecutionPhase::Locked);
        assert_eq!(w.phase(1100), ExecutionPhase::Locked); // t == deadline
    }

    #[test]
    fn test_dispute_window_is_half_open() {
        let w = will();
        assert_eq!(w.phase(1101), ExecutionPhase::Dispute);
        assert_eq!(w.phase(1150), ExecutionPhase::Dispute); // t == dispute_end
    }

    #[test]
    fn test_open_after_dispute_end() {
        let w = will();
        assert_eq!(w.phase(1151), ExecutionPhase::Open);
    }

    #[test]
    fn test_check_in_resets_the_window() {
        let mut w = will();
        w.check_in(1090).unwrap();
        assert_eq!(w.phase(1150), ExecutionPhase::Locked);
        assert_eq!(w.phase(1191), ExecutionPhase::Dispute);
    }
}
