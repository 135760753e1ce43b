//! Collaborators the orchestrator consumes from its host.
//!
//! The host owns package discovery, the project filesystem, user prompts,
//! static method invocation, session-scoped flags and the code-reload lock.
//! Each concern is one trait so a host can supply its own implementation;
//! simple in-process implementations are provided for library use and tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use pkgsync_fs::{NormalizedPath, io};
use pkgsync_manifest::DirectoryProbe;

use crate::{Error, Result};

/// An installed package as reported by the package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub resolved_root: NormalizedPath,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, resolved_root: impl Into<NormalizedPath>) -> Self {
        Self {
            name: name.into(),
            resolved_root: resolved_root.into(),
        }
    }
}

/// State of an outstanding host request.
#[derive(Debug)]
pub enum RequestStatus<T> {
    Pending,
    /// Finished, successfully or with the host's failure message.
    Completed(std::result::Result<T, String>),
}

/// A request that completes across several host ticks.
pub trait IndexRequest {
    /// Check for completion without blocking.
    fn poll(&mut self) -> RequestStatus<Vec<InstalledPackage>>;
}

/// The host's index of installed packages.
pub trait PackageIndex {
    fn list_installed(&mut self) -> Box<dyn IndexRequest>;
}

/// Project filesystem operations, with paths relative to the project root.
pub trait ProjectFilesystem: DirectoryProbe {
    /// Copy a payload (file or directory) to `destination`.
    fn copy_payload(&self, source: &str, destination: &str) -> pkgsync_fs::Result<u64>;

    /// Move a directory, replacing whatever is at `destination`.
    fn move_dir(&self, source: &str, destination: &str) -> pkgsync_fs::Result<()>;

    /// Directories under `root` that directly contain `file_name`.
    fn package_dirs(&self, root: &str, file_name: &str) -> pkgsync_fs::Result<Vec<String>>;
}

/// Asks the user to approve an action.
pub trait ConfirmationPrompt {
    fn confirm(&mut self, title: &str, message_lines: &[String]) -> bool;
}

/// Runs a static method by qualified name.
pub trait StaticInvoker {
    /// Fails with [`Error::InvocationNotFound`] or [`Error::Invocation`].
    fn invoke_static(&mut self, qualified_method: &str) -> Result<()>;
}

/// Integer flags scoped to one host session.
pub trait SessionStore {
    fn get_state(&self, key: &str, default: i64) -> i64;
    fn set_state(&mut self, key: &str, value: i64);
    fn erase(&mut self, key: &str);
}

/// Advisory lock that stops the host from reloading code.
pub trait ReloadHost {
    fn lock_reload(&self);
    fn unlock_reload(&self);
}

/// [`ProjectFilesystem`] over the local disk.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: NormalizedPath,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn resolve(&self, path: &str) -> NormalizedPath {
        let path = NormalizedPath::new(path);
        if path.to_native().is_absolute() {
            path
        } else {
            self.root.join(path.as_str())
        }
    }

    fn relative(&self, path: &NormalizedPath) -> String {
        path.as_str()
            .strip_prefix(self.root.as_str())
            .map(|rest| rest.trim_start_matches('/').to_string())
            .unwrap_or_else(|| path.as_str().to_string())
    }
}

impl DirectoryProbe for LocalFilesystem {
    fn exists_as_directory(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }
}

impl ProjectFilesystem for LocalFilesystem {
    fn copy_payload(&self, source: &str, destination: &str) -> pkgsync_fs::Result<u64> {
        io::copy_tree(&self.resolve(source), &self.resolve(destination))
    }

    fn move_dir(&self, source: &str, destination: &str) -> pkgsync_fs::Result<()> {
        io::move_dir(&self.resolve(source), &self.resolve(destination))
    }

    fn package_dirs(&self, root: &str, file_name: &str) -> pkgsync_fs::Result<Vec<String>> {
        let found = io::find_dirs_containing(&self.resolve(root), file_name)?;
        Ok(found.iter().map(|dir| self.relative(dir)).collect())
    }
}

/// [`PackageIndex`] over a fixed package list.
///
/// Each request reports `Pending` for `pending_polls` polls before completing.
#[derive(Debug, Clone, Default)]
pub struct FixedIndex {
    packages: Vec<InstalledPackage>,
    pending_polls: usize,
    failure: Option<String>,
    requests: Rc<RefCell<usize>>,
}

impl FixedIndex {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        Self {
            packages,
            ..Self::default()
        }
    }

    /// An index whose requests complete with a failure status.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_pending_polls(mut self, polls: usize) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Shared count of requests issued, readable after the index is moved.
    pub fn request_counter(&self) -> Rc<RefCell<usize>> {
        Rc::clone(&self.requests)
    }
}

struct FixedRequest {
    remaining: usize,
    result: Option<std::result::Result<Vec<InstalledPackage>, String>>,
}

impl IndexRequest for FixedRequest {
    fn poll(&mut self) -> RequestStatus<Vec<InstalledPackage>> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return RequestStatus::Pending;
        }
        match self.result.take() {
            Some(result) => RequestStatus::Completed(result),
            None => RequestStatus::Completed(Err("request already completed".to_string())),
        }
    }
}

impl PackageIndex for FixedIndex {
    fn list_installed(&mut self) -> Box<dyn IndexRequest> {
        *self.requests.borrow_mut() += 1;
        let result = match &self.failure {
            Some(message) => Err(message.clone()),
            None => Ok(self.packages.clone()),
        };
        Box::new(FixedRequest {
            remaining: self.pending_polls,
            result: Some(result),
        })
    }
}

/// [`ConfirmationPrompt`] with a scripted answer that records what it was shown.
#[derive(Debug, Clone)]
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<bool>>>,
    default: bool,
    shown: Rc<RefCell<Vec<Vec<String>>>>,
}

impl ScriptedPrompt {
    /// Always answer `answer`.
    pub fn always(answer: bool) -> Self {
        Self {
            answers: Rc::default(),
            default: answer,
            shown: Rc::default(),
        }
    }

    /// Answer from `answers` in order, then `default`.
    pub fn sequence(answers: impl IntoIterator<Item = bool>, default: bool) -> Self {
        Self {
            answers: Rc::new(RefCell::new(answers.into_iter().collect())),
            default,
            shown: Rc::default(),
        }
    }

    /// Message lines of every prompt shown so far.
    pub fn shown(&self) -> Vec<Vec<String>> {
        self.shown.borrow().clone()
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn confirm(&mut self, title: &str, message_lines: &[String]) -> bool {
        tracing::debug!(title, lines = message_lines.len(), "Confirmation requested");
        self.shown.borrow_mut().push(message_lines.to_vec());
        self.answers.borrow_mut().pop_front().unwrap_or(self.default)
    }
}

type Handler = Box<dyn FnMut() -> std::result::Result<(), String>>;

/// [`StaticInvoker`] backed by registered closures.
#[derive(Default)]
pub struct FnInvoker {
    handlers: HashMap<String, Handler>,
}

impl FnInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        qualified_method: impl Into<String>,
        handler: impl FnMut() -> std::result::Result<(), String> + 'static,
    ) {
        self.handlers.insert(qualified_method.into(), Box::new(handler));
    }
}

impl StaticInvoker for FnInvoker {
    fn invoke_static(&mut self, qualified_method: &str) -> Result<()> {
        let handler = self
            .handlers
            .get_mut(qualified_method)
            .ok_or_else(|| Error::InvocationNotFound {
                method: qualified_method.to_string(),
            })?;
        handler().map_err(|message| Error::Invocation {
            method: qualified_method.to_string(),
            message,
        })
    }
}

/// In-memory [`SessionStore`]; clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Rc<RefCell<HashMap<String, i64>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_state(&self, key: &str, default: i64) -> i64 {
        self.values.borrow().get(key).copied().unwrap_or(default)
    }

    fn set_state(&mut self, key: &str, value: i64) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    fn erase(&mut self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// [`ReloadHost`] that only counts lock transitions.
#[derive(Debug, Default)]
pub struct CountingReloadHost {
    locks: std::cell::Cell<usize>,
    unlocks: std::cell::Cell<usize>,
}

impl CountingReloadHost {
    pub fn locks(&self) -> usize {
        self.locks.get()
    }

    pub fn unlocks(&self) -> usize {
        self.unlocks.get()
    }

    pub fn is_locked(&self) -> bool {
        self.locks.get() > self.unlocks.get()
    }
}

impl ReloadHost for CountingReloadHost {
    fn lock_reload(&self) {
        self.locks.set(self.locks.get() + 1);
        tracing::debug!("Reload locked");
    }

    fn unlock_reload(&self) {
        self.unlocks.set(self.unlocks.get() + 1);
        tracing::debug!("Reload unlocked");
    }
}
