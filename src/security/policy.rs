//! Action allow-list and per-action parameter limits.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Typed optional-returning lookups over the configured tables
//! - Policy decides what is allowed; sanitization elsewhere applies the limits

use std::collections::{HashMap, HashSet};

use crate::config::schema::ActionsConfig;

/// Static, configuration-driven action rules.
pub struct ActionPolicy {
    public: HashSet<String>,
    max_count: HashMap<String, u64>,
    max_accounts: HashMap<String, usize>,
}

impl ActionPolicy {
    pub fn from_config(actions: &ActionsConfig) -> Self {
        Self {
            public: actions.public.iter().cloned().collect(),
            max_count: actions.max_count.clone(),
            max_accounts: actions.max_accounts.clone(),
        }
    }

    /// Whether the action is in the public allow-list.
    pub fn is_publicly_allowed(&self, action: &str) -> bool {
        self.public.contains(action)
    }

    /// Configured upper bound for the action's `count` parameter, if any.
    pub fn max_count(&self, action: &str) -> Option<u64> {
        self.max_count.get(action).copied()
    }

    /// Configured upper bound for the action's `accounts` list, if any.
    pub fn max_accounts(&self, action: &str) -> Option<usize> {
        self.max_accounts.get(action).copied()
    }
}
