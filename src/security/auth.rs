//! Credential resolution against the configured user table.

use std::collections::{HashMap, HashSet};

use crate::config::schema::UserConfig;

/// A configured user: a stable bearer token plus the extra actions it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub token: String,
    pub extra_actions: HashSet<String>,
}

/// Pure lookup from credential string to user record.
///
/// The table is built once at startup and never mutated at request time.
pub struct AuthResolver {
    users: HashMap<String, UserRecord>,
}

impl AuthResolver {
    pub fn from_config(users: &[UserConfig]) -> Self {
        let users = users
            .iter()
            .map(|user| {
                (
                    user.token.clone(),
                    UserRecord {
                        token: user.token.clone(),
                        extra_actions: user.extra_actions.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        Self { users }
    }

    /// Resolve a credential to its user record, or `None` for an unknown token.
    pub fn resolve(&self, credential: &str) -> Option<&UserRecord> {
        self.users.get(credential)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
