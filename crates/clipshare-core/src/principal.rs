//! Verified user identity and its filesystem partition key.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A verified principal. The email is the sole identity unit; there is no
/// user record beyond it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}

impl Principal {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// Filesystem-safe partition key for this principal.
    pub fn partition_key(&self) -> String {
        partition_key(&self.email)
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.email)
    }
}

/// Map an email to its partition directory name: every non-alphanumeric byte
/// becomes `_`. The mapping is lossy (emails differing only in punctuation
/// collide); accepted for the small allow-listed user set this serves.
pub fn partition_key(email: &str) -> String {
    email
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
