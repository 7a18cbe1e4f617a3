//! Email allow-list policy
//!
//! Authentication proves who the caller is; this policy decides whether that
//! identity is allowed in at all. Membership is exact-match on the lowercased
//! email address.

use clipshare_core::AppError;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed_emails: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_emails.is_empty()
    }

    /// Check a verified email against the allow-list.
    ///
    /// An empty allow-list is a deployment mistake, not an open door, so it
    /// denies everyone with a config error rather than granting access.
    pub fn authorize(&self, email: &str) -> Result<(), AppError> {
        if self.allowed_emails.is_empty() {
            tracing::error!("Access denied: allow-list is empty");
            return Err(AppError::Config(
                "No allowed emails configured".to_string(),
            ));
        }

        let normalized = email.trim().to_lowercase();
        if self.allowed_emails.contains(&normalized) {
            tracing::debug!(email = %normalized, "Access granted");
            Ok(())
        } else {
            tracing::warn!(email = %normalized, "Access denied: email not on allow-list");
            Err(AppError::Forbidden(normalized))
        }
    }
}
