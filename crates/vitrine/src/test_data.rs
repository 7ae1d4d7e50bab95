//! Test data records.
//!
//! Records are plain values. The only runtime-derived piece is the
//! timestamp-uniqued email used for registrations, so two scenarios never
//! race on the same account.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static UNIQUE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A customer account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Phone number
    pub phone: String,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::default_test_user()
    }
}

impl UserRecord {
    /// The configured default test user
    #[must_use]
    pub fn default_test_user() -> Self {
        Self {
            email: "testuser@example.com".to_string(),
            password: "TestPassword123!".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: "+254700000000".to_string(),
        }
    }

    /// A valid registration record with a fresh email
    #[must_use]
    pub fn valid_unique() -> Self {
        Self {
            email: unique_email("testuser"),
            ..Self::default_test_user()
        }
    }

    /// Same record with another email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Same record with another password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Registration record with a malformed email
    #[must_use]
    pub fn invalid_email() -> Self {
        Self::valid_unique().with_email(InvalidData::INVALID_EMAIL)
    }

    /// Registration record with a weak password
    #[must_use]
    pub fn weak_password() -> Self {
        Self::valid_unique().with_password(InvalidData::WEAK_PASSWORD)
    }
}

/// Values that a well-behaved site must reject
#[derive(Debug, Clone, Copy)]
pub struct InvalidData;

impl InvalidData {
    /// Not an email address
    pub const INVALID_EMAIL: &'static str = "invalid-email";
    /// Well-formed address with no account behind it
    pub const NONEXISTENT_EMAIL: &'static str = "nonexistent@example.com";
    /// Wrong password for the default user
    pub const WRONG_PASSWORD: &'static str = "WrongPassword123!";
    /// Too short and too simple
    pub const WEAK_PASSWORD: &'static str = "123";
    /// Malformed addresses exercised by validation scenarios
    pub const MALFORMED_EMAILS: [&'static str; 5] = [
        "invalid-email",
        "@example.com",
        "test@",
        "test..test@example.com",
        "test@.com",
    ];
    /// Markup a form or search box must not render
    pub const SCRIPT_INJECTION: &'static str = "<script>alert('xss')</script>";
    /// Classic always-true SQL fragment
    pub const SQL_INJECTION: &'static str = "' OR '1'='1";
    /// Cart quantities a quantity field has to cope with
    pub const ODD_QUANTITIES: [&'static str; 5] = ["-1", "abc", "0.5", "999999", "0"];
    /// Search terms outside the happy path
    pub const ODD_SEARCH_TERMS: [&'static str; 4] = [
        Self::SCRIPT_INJECTION,
        Self::SQL_INJECTION,
        "👗 dress",
        "Платье",
    ];

    /// Search term longer than any sane input
    #[must_use]
    pub fn long_search_term() -> String {
        "a".repeat(1000)
    }

    /// Address that no mail system accepts: 300 character local part
    #[must_use]
    pub fn oversized_email() -> String {
        format!("{}@example.com", "a".repeat(300))
    }
}

/// `<prefix>_<unix-seconds>_<seq>@example.com`, unique within the process
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let seq = UNIQUE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "{prefix}_{}_{seq}@example.com",
        chrono::Utc::now().timestamp()
    )
}

/// Loose syntactic email check: one `@`, non-empty local part, dotted domain
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains("..")
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unique_emails_differ() {
        let a = unique_email("testuser");
        let b = unique_email("testuser");
        assert_ne!(a, b);
        assert!(a.starts_with("testuser_"));
        assert!(looks_like_email(&a));
    }

    #[test]
    fn test_invalid_records() {
        assert_eq!(UserRecord::invalid_email().email, "invalid-email");
        assert_eq!(UserRecord::weak_password().password, "123");
        assert_eq!(UserRecord::weak_password().first_name, "Test");
    }

    #[test]
    fn test_oversized_inputs() {
        assert_eq!(InvalidData::long_search_term().len(), 1000);
        let email = InvalidData::oversized_email();
        assert!(email.ends_with("@example.com"));
        assert!(!looks_like_email(InvalidData::SQL_INJECTION));
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        for email in InvalidData::MALFORMED_EMAILS {
            assert!(!looks_like_email(email), "{email} accepted");
        }
        assert!(looks_like_email(InvalidData::NONEXISTENT_EMAIL));
    }

    proptest! {
        #[test]
        fn prop_generated_emails_are_wellformed(prefix in "[a-z]{1,12}") {
            prop_assert!(looks_like_email(&unique_email(&prefix)));
        }
    }
}
