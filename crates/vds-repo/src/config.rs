use serde::{Deserialize, Serialize};
use vds_types::Signature;

use crate::error::{RepoError, RepoResult};
use crate::history::HistoryOptions;

/// Tunables for a [`Repository`](crate::Repository).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// How many times a write re-runs after losing the HEAD race.
    pub max_write_retries: u32,
    /// Commits a single history walk may visit.
    pub history_max_steps: usize,
    /// Reserved path suffix that turns a read into a metadata query.
    /// Writes may not target paths ending in it.
    pub metadata_suffix: String,
    /// Identity recorded on commits whose writer supplied none.
    pub default_author: AuthorConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            max_write_retries: 8,
            history_max_steps: 10_000,
            metadata_suffix: ".json".into(),
            default_author: AuthorConfig::default(),
        }
    }
}

impl RepoConfig {
    /// The default author, stamped with the current time.
    pub fn default_signature(&self) -> RepoResult<Signature> {
        Signature::now(&self.default_author.name, &self.default_author.email)
            .map_err(|e| RepoError::Config(format!("default_author: {e}")))
    }

    /// History options with this configuration's step budget and no limit.
    pub fn history_options(&self) -> HistoryOptions {
        HistoryOptions {
            max_steps: self.history_max_steps,
            limit: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "Anonymous".into(),
            email: "anonymous@localhost".into(),
        }
    }
}
