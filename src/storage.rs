//! The storage module provides the persisted key-value cache holding summaries,
//! privacy scores and user consents, backed by SQLite.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::DocumentKind;
use crate::constants::{POLICY_KEY_PREFIX, SCORE_KEY_PREFIX, TERMS_KEY_PREFIX, USER_CONSENTS_KEY};
use crate::error::{PipelineError, Result};

/// Keys of the cache, serialized exactly as the extension stores them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CacheKey<'a> {
    /// `summarizedPolicy_{origin}` or `summarizedTerms_{origin}`
    Summary(DocumentKind, &'a str),
    /// `privacyScore_{origin}`
    Score(&'a str),
    /// `userConsents`
    UserConsents,
}

impl std::fmt::Display for CacheKey<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Summary(DocumentKind::PrivacyPolicy, origin) => {
                write!(formatter, "{POLICY_KEY_PREFIX}{origin}")
            }
            CacheKey::Summary(DocumentKind::TermsOfService, origin) => {
                write!(formatter, "{TERMS_KEY_PREFIX}{origin}")
            }
            CacheKey::Score(origin) => write!(formatter, "{SCORE_KEY_PREFIX}{origin}"),
            CacheKey::UserConsents => formatter.write_str(USER_CONSENTS_KEY),
        }
    }
}

/// Everything cached for one origin.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    pub policy: Option<String>,
    pub terms: Option<String>,
    pub score: Option<u32>,
}

impl SiteRecord {
    pub fn summary(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::PrivacyPolicy => self.policy.as_deref(),
            DocumentKind::TermsOfService => self.terms.as_deref(),
        }
    }
}

/// Storage provides the flat key-value cache. Entries never expire; writes to the
/// same key overwrite each other, last writer wins.
pub struct Storage {
    /// The underlying SQLite connection wrapped in Arc<Mutex<>> to make it thread-safe
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Creates a new Storage instance with a database at the specified path.
    ///
    /// `:memory:` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if database creation fails
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initializes the database schema with the entries table if it doesn't exist.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            params![],
        )?;

        Ok(())
    }

    /// Reads the raw value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn get(&self, key: CacheKey<'_>) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare("SELECT value FROM entries WHERE key = ?1")?;
        let value: Option<String> = stmt
            .query_row([key.to_string()], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    /// Stores several values at once, overwriting previous ones.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn set_many(&self, entries: &[(CacheKey<'_>, String)]) -> Result<()> {
        let mut conn = self.conn.lock().expect("Storage mutex poisoned");
        let tx = conn.transaction()?;
        let updated_at = Utc::now().timestamp();

        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key.to_string(), value, updated_at],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Gets the cached summary of a document kind for an origin.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub fn cached_summary(&self, origin: &str, kind: DocumentKind) -> Result<Option<String>> {
        self.get(CacheKey::Summary(kind, origin))
    }

    /// Gets the cached privacy score for an origin.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the stored score is not a number
    pub fn cached_score(&self, origin: &str) -> Result<Option<u32>> {
        let key = CacheKey::Score(origin);
        self.get(key)?
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| PipelineError::Parse(format!("invalid score under {key}: {e}")))
            })
            .transpose()
    }

    /// Persists the summary and score of one pipeline run together.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub fn store_analysis(
        &self,
        origin: &str,
        kind: DocumentKind,
        summary: &str,
        score: u32,
    ) -> Result<()> {
        self.set_many(&[
            (CacheKey::Summary(kind, origin), summary.to_string()),
            (CacheKey::Score(origin), score.to_string()),
        ])
    }

    /// Collects everything cached for an origin.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub fn site_record(&self, origin: &str) -> Result<SiteRecord> {
        Ok(SiteRecord {
            policy: self.cached_summary(origin, DocumentKind::PrivacyPolicy)?,
            terms: self.cached_summary(origin, DocumentKind::TermsOfService)?,
            score: self.cached_score(origin)?,
        })
    }

    /// Returns the whole site to consent mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the stored map is corrupt
    pub fn user_consents(&self) -> Result<BTreeMap<String, bool>> {
        match self.get(CacheKey::UserConsents)? {
            Some(value) => serde_json::from_str(&value)
                .map_err(|e| PipelineError::Parse(format!("invalid {USER_CONSENTS_KEY}: {e}"))),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Gets the recorded consent of a site, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the stored map is corrupt
    pub fn user_consent(&self, site: &str) -> Result<Option<bool>> {
        Ok(self.user_consents()?.get(site).copied())
    }

    /// Records the consent of a site, keeping the other sites untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the stored map is corrupt
    pub fn save_user_consent(&self, site: &str, consent: bool) -> Result<()> {
        let mut consents = self.user_consents()?;
        consents.insert(site.to_string(), consent);
        let value = serde_json::to_string(&consents)
            .map_err(|e| PipelineError::Parse(format!("unable to encode consents: {e}")))?;

        self.set_many(&[(CacheKey::UserConsents, value)])
    }
}
