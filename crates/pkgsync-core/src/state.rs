//! Session-scoped resolution state and the busy guard.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::host::{ReloadHost, SessionStore};

/// Session key holding the [`ResolutionState`].
pub const RESOLUTION_STATE_KEY: &str = "resolve-packages-state";

/// Prefix of the per-package consent flags.
const CONSENT_KEY_PREFIX: &str = "consent:";

/// Progress of the full resolution pass within one host session.
///
/// `InProgress` read back at startup means an earlier pass was interrupted;
/// it is treated like `Pending`, never like `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionState {
    Pending,
    InProgress,
    Done,
}

impl ResolutionState {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    /// Unknown values read as `Pending` so a pass re-runs.
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Self::InProgress,
            2 => Self::Done,
            _ => Self::Pending,
        }
    }

    pub fn load(store: &dyn SessionStore) -> Self {
        Self::from_i64(store.get_state(RESOLUTION_STATE_KEY, Self::Pending.as_i64()))
    }

    pub fn store(self, store: &mut dyn SessionStore) {
        store.set_state(RESOLUTION_STATE_KEY, self.as_i64());
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

pub fn has_consent(store: &dyn SessionStore, package: &str) -> bool {
    store.get_state(&format!("{CONSENT_KEY_PREFIX}{package}"), 0) != 0
}

pub fn record_consent(store: &mut dyn SessionStore, package: &str) {
    store.set_state(&format!("{CONSENT_KEY_PREFIX}{package}"), 1);
}

/// Counts nested busy scopes and holds the host's reload lock while any is open.
///
/// The lock is taken on the 0→1 transition and released on 1→0, so nested
/// or overlapping operations coalesce into one lock.
#[derive(Clone)]
pub struct BusyCounter {
    count: Rc<Cell<usize>>,
    host: Rc<dyn ReloadHost>,
}

impl BusyCounter {
    pub fn new(host: Rc<dyn ReloadHost>) -> Self {
        Self {
            count: Rc::new(Cell::new(0)),
            host,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.count.get() > 0
    }

    /// Open a busy scope; it closes when the guard drops.
    pub fn acquire(&self) -> BusyGuard {
        let previous = self.count.get();
        if previous == 0 {
            self.host.lock_reload();
        }
        self.count.set(previous + 1);
        BusyGuard {
            counter: self.clone(),
        }
    }
}

/// Scope of a [`BusyCounter`]. Released on drop, including on error paths.
#[must_use = "the busy scope ends as soon as the guard is dropped"]
pub struct BusyGuard {
    counter: BusyCounter,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let remaining = self.counter.count.get().saturating_sub(1);
        self.counter.count.set(remaining);
        if remaining == 0 {
            self.counter.host.unlock_reload();
        }
    }
}
