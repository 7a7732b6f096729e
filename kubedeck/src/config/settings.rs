//! Live alerting settings.
//!
//! [`SettingsStore`] holds the bot credential, poll interval, recipient list and
//! response style behind a read/write lock. It also owns the *generation
//! token*: whenever an applied update changes something while the scheduler is
//! running, the current token is cancelled and a fresh one installed before
//! the update returns. Every task of one scheduler launch watches the token that
//! was current at launch, so cancelling it stops exactly that launch.

use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Chat ids used when the configured recipient list is empty.
pub const DEFAULT_CHAT_IDS: &[i64] = &[-4835116305];

/// Default interval between check cycles (45 minutes).
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(2700);

/// Longest accepted interval between check cycles (one week).
pub const MAX_CHECK_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default style hint passed to the recommendation engine.
pub const DEFAULT_RESPONSE_STYLE: &str =
    "Technical report on Kubernetes resource health with actionable recommendations.";

/// Initial values for a [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub token: String,
    pub check_interval: Duration,
    pub chat_ids: Vec<i64>,
    pub response_style: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            chat_ids: DEFAULT_CHAT_IDS.to_vec(),
            response_style: DEFAULT_RESPONSE_STYLE.to_string(),
        }
    }
}

/// Partial settings update.
///
/// Every field is optional; absent, empty or out-of-range values leave the
/// current setting untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "checkInterval")]
    pub check_interval_secs: Option<i64>,
    #[serde(default, rename = "chatIDs")]
    pub chat_ids: Option<Vec<i64>>,
    #[serde(default, rename = "responseStyle")]
    pub response_style: Option<String>,
}

impl SettingsUpdate {
    pub fn token_supplied(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn interval_supplied(&self) -> bool {
        self.check_interval_secs
            .is_some_and(|secs| secs > 0 && secs.unsigned_abs() <= MAX_CHECK_INTERVAL.as_secs())
    }

    pub fn chat_ids_supplied(&self) -> bool {
        self.chat_ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }

    pub fn style_supplied(&self) -> bool {
        self.response_style
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Whether at least one field carries a usable value.
    pub fn is_effective(&self) -> bool {
        self.token_supplied()
            || self.interval_supplied()
            || self.chat_ids_supplied()
            || self.style_supplied()
    }
}

/// Point-in-time copy of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub token: String,
    pub check_interval: Duration,
    pub chat_ids: Vec<i64>,
    pub response_style: String,
    pub running: bool,
}

impl SettingsSnapshot {
    /// Token with everything after the first 8 characters hidden.
    pub fn masked_token(&self) -> String {
        mask_token(&self.token)
    }
}

/// Mask a credential for logs and API responses.
pub fn mask_token(token: &str) -> String {
    if token.chars().count() > 8 {
        let prefix: String = token.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        "********".to_string()
    }
}

struct Inner {
    token: String,
    check_interval: Duration,
    chat_ids: Vec<i64>,
    response_style: String,
    running: bool,
    generation: CancellationToken,
    generation_count: u64,
}

/// Thread-safe store for the live alerting settings.
pub struct SettingsStore {
    inner: RwLock<Inner>,
}

impl SettingsStore {
    pub fn new(initial: AlertSettings) -> Self {
        let check_interval = if initial.check_interval.is_zero() {
            DEFAULT_CHECK_INTERVAL
        } else {
            initial.check_interval.min(MAX_CHECK_INTERVAL)
        };

        Self {
            inner: RwLock::new(Inner {
                token: initial.token,
                check_interval,
                chat_ids: dedup_preserving_order(&initial.chat_ids),
                response_style: initial.response_style,
                running: false,
                generation: CancellationToken::new(),
                generation_count: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        let inner = self.inner.read();
        SettingsSnapshot {
            token: inner.token.clone(),
            check_interval: inner.check_interval,
            chat_ids: effective_chat_ids(&inner.chat_ids),
            response_style: inner.response_style.clone(),
            running: inner.running,
        }
    }

    pub fn token(&self) -> String {
        self.inner.read().token.clone()
    }

    pub fn check_interval(&self) -> Duration {
        self.inner.read().check_interval
    }

    /// Current recipients as an independent copy.
    ///
    /// Falls back to [`DEFAULT_CHAT_IDS`] when the list is empty.
    pub fn chat_ids(&self) -> Vec<i64> {
        effective_chat_ids(&self.inner.read().chat_ids)
    }

    pub fn response_style(&self) -> String {
        self.inner.read().response_style.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.read().running
    }

    /// The generation token tasks should watch right now.
    pub fn generation(&self) -> CancellationToken {
        self.inner.read().generation.clone()
    }

    /// Number of restarts signalled since the store was created.
    pub fn generation_count(&self) -> u64 {
        self.inner.read().generation_count
    }

    /// Mark the scheduler active and return the generation token to watch.
    pub fn mark_running(&self) -> CancellationToken {
        let mut inner = self.inner.write();
        inner.running = true;
        inner.generation.clone()
    }

    pub fn mark_stopped(&self) {
        self.inner.write().running = false;
    }

    /// Apply a partial update and report whether anything changed.
    ///
    /// When something changed and the scheduler is running, the current
    /// generation is cancelled and replaced under the same write lock, so a
    /// task woken by the old token always reads the new values.
    pub fn apply_update(&self, update: &SettingsUpdate) -> bool {
        let mut inner = self.inner.write();
        let mut changed = false;

        if let Some(token) = update.token.as_deref()
            && !token.is_empty()
            && token != inner.token
        {
            inner.token = token.to_string();
            changed = true;
        }

        if let Some(secs) = update.check_interval_secs
            && update.interval_supplied()
        {
            let interval = Duration::from_secs(secs.unsigned_abs());
            if interval != inner.check_interval {
                inner.check_interval = interval;
                changed = true;
            }
        }

        if let Some(ids) = update.chat_ids.as_deref()
            && !ids.is_empty()
        {
            let ids = dedup_preserving_order(ids);
            // Order-sensitive: a permutation of the same ids counts as a change.
            if ids != inner.chat_ids {
                inner.chat_ids = ids;
                changed = true;
            }
        }

        if let Some(style) = update.response_style.as_deref()
            && !style.trim().is_empty()
            && style != inner.response_style
        {
            inner.response_style = style.to_string();
            changed = true;
        }

        if changed && inner.running {
            inner.generation.cancel();
            inner.generation = CancellationToken::new();
            inner.generation_count += 1;
            debug!(
                generation = inner.generation_count,
                "Alert settings changed, restart signalled"
            );
        }

        changed
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(AlertSettings::default())
    }
}

fn effective_chat_ids(ids: &[i64]) -> Vec<i64> {
    if ids.is_empty() {
        DEFAULT_CHAT_IDS.to_vec()
    } else {
        ids.to_vec()
    }
}

fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
