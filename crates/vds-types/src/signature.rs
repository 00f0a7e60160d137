use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of an author or committer, plus the moment they acted.
///
/// The timestamp keeps its original UTC offset so that a commit made at
/// `23:08:01+02:00` renders the same way it was recorded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Display name (e.g. "Ada Lovelace").
    pub name: String,
    /// Email address. May be empty, never contains `<` or `>`.
    pub email: String,
    /// When the action happened.
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    /// Create a signature with an explicit timestamp.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<FixedOffset>,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(TypeError::InvalidSignature("name must not be empty".into()));
        }
        for field in [&name, &email] {
            if field.contains(['<', '>', '\n']) {
                return Err(TypeError::InvalidSignature(format!(
                    "{field:?} contains '<', '>' or a newline"
                )));
            }
        }
        Ok(Self { name, email, when })
    }

    /// Create a signature stamped with the current wall-clock time (UTC).
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(name, email, Utc::now().fixed_offset())
    }

    /// Create a signature at a UNIX timestamp (seconds, UTC).
    pub fn at_unix(
        name: impl Into<String>,
        email: impl Into<String>,
        seconds: i64,
    ) -> Result<Self, TypeError> {
        let when = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| {
                TypeError::InvalidSignature(format!("timestamp out of range: {seconds}"))
            })?;
        Self::new(name, email, when.fixed_offset())
    }

    /// Same identity, restamped at `when`.
    pub fn with_time(&self, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: self.name.clone(),
            email: self.email.clone(),
            when,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when.to_rfc3339())
    }
}
