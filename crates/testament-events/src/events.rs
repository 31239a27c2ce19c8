//! # Will Events
//!
//! Every state transition of a will emits exactly one of these facts. Each
//! event is addressed to a will by testator identity and carries everything
//! the projection needs for an unconditional upsert: vault events carry the
//! post-operation absolute balance, never just the delta, so duplicate
//! delivery is harmless.

use serde::{Deserialize, Serialize};
use testament_types::{Address, Amount, ContentHash, Timestamp};

/// One payout line of an executed distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Receiving wallet.
    pub wallet: Address,
    /// Amount transferred, after floor division.
    pub amount: Amount,
}

/// All events emitted by the will lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WillEvent {
    /// A testator created their will.
    WillCreated {
        testator: Address,
        check_in_period: u64,
        dispute_period: u64,
        created_at: Timestamp,
    },

    /// The testator renewed the dead-man's-switch timer.
    CheckIn {
        testator: Address,
        checked_in_at: Timestamp,
    },

    /// The guardian moved to execute during the dispute window.
    DisputeStarted {
        testator: Address,
        guardian: Address,
        started_at: Timestamp,
    },

    /// The will was executed and both vaults zeroed.
    WillExecuted {
        testator: Address,
        executed_by: Address,
        executed_at: Timestamp,
        total_distributed: Amount,
        payouts: Vec<Payout>,
    },

    /// A beneficiary entry was appended.
    BeneficiaryAdded {
        testator: Address,
        wallet: Address,
        share: u8,
        guardian: bool,
    },

    /// A beneficiary's share and guardian flag were replaced.
    BeneficiaryUpdated {
        testator: Address,
        wallet: Address,
        share: u8,
        guardian: bool,
    },

    /// A beneficiary entry was removed.
    BeneficiaryRemoved { testator: Address, wallet: Address },

    /// Value entered the locked vault. `locked_balance` is the balance
    /// after the deposit.
    DepositLocked {
        testator: Address,
        amount: Amount,
        locked_balance: Amount,
    },

    /// Value entered the flexible vault. `flexible_balance` is the balance
    /// after the deposit.
    DepositFlexible {
        testator: Address,
        amount: Amount,
        flexible_balance: Amount,
    },

    /// The testator withdrew from the flexible vault. `flexible_balance` is
    /// the balance after the withdrawal.
    WithdrawFlexible {
        testator: Address,
        amount: Amount,
        flexible_balance: Amount,
    },

    /// A document reference was attached.
    DocumentAdded {
        testator: Address,
        hash: ContentHash,
        name: String,
        category: String,
        uploaded_at: Timestamp,
    },

    /// A document reference was detached.
    DocumentRemoved {
        testator: Address,
        hash: ContentHash,
    },
}

impl WillEvent {
    /// The will this event is addressed to.
    #[must_use]
    pub fn testator(&self) -> Address {
        match self {
            Self::WillCreated { testator, .. }
            | Self::CheckIn { testator, .. }
            | Self::DisputeStarted { testator, .. }
            | Self::WillExecuted { testator, .. }
            | Self::BeneficiaryAdded { testator, .. }
            | Self::BeneficiaryUpdated { testator, .. }
            | Self::BeneficiaryRemoved { testator, .. }
            | Self::DepositLocked { testator, .. }
            | Self::DepositFlexible { testator, .. }
            | Self::WithdrawFlexible { testator, .. }
            | Self::DocumentAdded { testator, .. }
            | Self::DocumentRemoved { testator, .. } => *testator,
        }
    }

    /// The topic for this event (for subscription filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::WillCreated { .. }
            | Self::CheckIn { .. }
            | Self::DisputeStarted { .. }
            | Self::WillExecuted { .. } => EventTopic::Lifecycle,
            Self::BeneficiaryAdded { .. }
            | Self::BeneficiaryUpdated { .. }
            | Self::BeneficiaryRemoved { .. } => EventTopic::Shares,
            Self::DepositLocked { .. }
            | Self::DepositFlexible { .. }
            | Self::WithdrawFlexible { .. } => EventTopic::Vaults,
            Self::DocumentAdded { .. } | Self::DocumentRemoved { .. } => EventTopic::Documents,
        }
    }

    /// Stable kind name, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WillCreated { .. } => "WillCreated",
            Self::CheckIn { .. } => "CheckIn",
            Self::DisputeStarted { .. } => "DisputeStarted",
            Self::WillExecuted { .. } => "WillExecuted",
            Self::BeneficiaryAdded { .. } => "BeneficiaryAdded",
            Self::BeneficiaryUpdated { .. } => "BeneficiaryUpdated",
            Self::BeneficiaryRemoved { .. } => "BeneficiaryRemoved",
            Self::DepositLocked { .. } => "DepositLocked",
            Self::DepositFlexible { .. } => "DepositFlexible",
            Self::WithdrawFlexible { .. } => "WithdrawFlexible",
            Self::DocumentAdded { .. } => "DocumentAdded",
            Self::DocumentRemoved { .. } => "DocumentRemoved",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Creation, check-ins, disputes, execution.
    Lifecycle,
    /// Beneficiary share mutations.
    Shares,
    /// Vault deposits and withdrawals.
    Vaults,
    /// Document attach/detach.
    Documents,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Wills to include. Empty means all wills.
    pub wills: Vec<Address>,
}

impl EventFilter {
    /// A filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            wills: Vec::new(),
        }
    }

    /// A filter for events addressed to specific wills.
    #[must_use]
    pub fn wills(wills: Vec<Address>) -> Self {
        Self {
            topics: Vec::new(),
            wills,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &WillEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let will_match = self.wills.is_empty() || self.wills.contains(&event.testator());

        topic_match && will_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testator() -> Address {
        Address::from_bytes([7u8; 20])
    }

    #[test]
    fn test_topic_mapping() {
        let event = WillEvent::CheckIn {
            testator: testator(),
            checked_in_at: 100,
        };
        assert_eq!(event.topic(), EventTopic::Lifecycle);
        assert_eq!(event.kind(), "CheckIn");

        let event = WillEvent::DepositLocked {
            testator: testator(),
            amount: 5,
            locked_balance: 5,
        };
        assert_eq!(event.topic(), EventTopic::Vaults);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        let event = WillEvent::CheckIn {
            testator: testator(),
            checked_in_at: 100,
        };
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Shares]);
        let share_event = WillEvent::BeneficiaryRemoved {
            testator: testator(),
            wallet: Address::from_bytes([2u8; 20]),
        };
        assert!(filter.matches(&share_event));

        let lifecycle_event = WillEvent::CheckIn {
            testator: testator(),
            checked_in_at: 100,
        };
        assert!(!filter.matches(&lifecycle_event));
    }

    #[test]
    fn test_filter_by_will() {
        let other = Address::from_bytes([9u8; 20]);
        let filter = EventFilter::wills(vec![testator()]);

        let mine = WillEvent::CheckIn {
            testator: testator(),
            checked_in_at: 1,
        };
        let theirs = WillEvent::CheckIn {
            testator: other,
            checked_in_at: 1,
        };
        assert!(filter.matches(&mine));
        assert!(!filter.matches(&theirs));
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = WillEvent::WillExecuted {
            testator: testator(),
            executed_by: Address::from_bytes([2u8; 20]),
            executed_at: 999,
            total_distributed: 15,
            payouts: vec![Payout {
                wallet: Address::from_bytes([2u8; 20]),
                amount: 15,
            }],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: WillEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
