//! Host collaborators for running the orchestrator from a terminal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use colored::Colorize;
use dialoguer::Confirm;

use pkgsync_core::{
    ConfirmationPrompt, Error, IndexRequest, InstalledPackage, PackageIndex, ReloadHost, RequestStatus,
    SessionStore, StaticInvoker,
};
use pkgsync_fs::{NormalizedPath, io};

/// Session file, relative to the project root.
pub const SESSION_FILE: &str = ".pkgsync/session.json";

/// [`PackageIndex`] that scans the packages root on a worker thread.
///
/// A package is any directory under the packages root that directly
/// contains the package manifest.
pub struct DirectoryIndex {
    packages_root: NormalizedPath,
    manifest_file_name: String,
}

impl DirectoryIndex {
    pub fn new(packages_root: NormalizedPath, manifest_file_name: impl Into<String>) -> Self {
        Self {
            packages_root,
            manifest_file_name: manifest_file_name.into(),
        }
    }
}

impl PackageIndex for DirectoryIndex {
    fn list_installed(&mut self) -> Box<dyn IndexRequest> {
        let (sender, receiver) = mpsc::channel();
        let root = self.packages_root.clone();
        let file_name = self.manifest_file_name.clone();

        thread::spawn(move || {
            let result: Result<Vec<InstalledPackage>, String> = io::find_dirs_containing(&root, &file_name)
                .map(|dirs| {
                    dirs.into_iter()
                        .map(|dir| {
                            let name = dir.file_name().unwrap_or_default().to_string();
                            InstalledPackage::new(name, dir)
                        })
                        .collect()
                })
                .map_err(|e| e.to_string());
            // The receiver is gone only if the orchestrator was dropped
            let _ = sender.send(result);
        });

        Box::new(ChannelRequest { receiver })
    }
}

struct ChannelRequest {
    receiver: Receiver<Result<Vec<InstalledPackage>, String>>,
}

impl IndexRequest for ChannelRequest {
    fn poll(&mut self) -> RequestStatus<Vec<InstalledPackage>> {
        match self.receiver.try_recv() {
            Ok(result) => RequestStatus::Completed(result),
            Err(TryRecvError::Empty) => RequestStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                RequestStatus::Completed(Err("package index worker exited without a result".to_string()))
            }
        }
    }
}

/// [`SessionStore`] persisted as a JSON object in [`SESSION_FILE`].
///
/// Every change is written through, so the state survives the process the
/// way a host session survives code reloads. `pkgsync reset` ends the session.
pub struct FileSessionStore {
    path: NormalizedPath,
    values: BTreeMap<String, i64>,
}

impl FileSessionStore {
    /// Open the session of `project_root`. A missing or unreadable file is an empty session.
    pub fn open(project_root: &Path) -> Self {
        let path = NormalizedPath::new(project_root.join(SESSION_FILE));
        let values = match io::read_text(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path, "Ignoring unreadable session file: {}", e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Drop every flag and delete the session file.
    pub fn clear(&mut self) -> std::io::Result<()> {
        self.values.clear();
        match std::fs::remove_file(self.path.to_native()) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn persist(&self) {
        let written = serde_json::to_vec_pretty(&self.values)
            .map_err(|e| e.to_string())
            .and_then(|bytes| io::write_atomic(&self.path, &bytes).map_err(|e| e.to_string()));
        if let Err(e) = written {
            tracing::warn!(path = %self.path, "Could not save session state: {}", e);
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get_state(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_state(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.persist();
    }

    fn erase(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }
}

/// [`ConfirmationPrompt`] on the terminal.
///
/// With `assume_yes` the message is still printed but no input is read. A
/// prompt that cannot be shown (no terminal) counts as declined.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmationPrompt for TerminalPrompt {
    fn confirm(&mut self, title: &str, message_lines: &[String]) -> bool {
        println!("{}", title.bold());
        for line in message_lines {
            println!("  {}", line);
        }

        if self.assume_yes {
            return true;
        }

        match Confirm::new().with_prompt("Continue").default(true).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Confirmation unavailable, treating as declined: {}", e);
                false
            }
        }
    }
}

/// [`StaticInvoker`] mapping method names to shell commands from `[actions]`.
pub struct ShellInvoker {
    commands: BTreeMap<String, String>,
    working_dir: PathBuf,
}

impl ShellInvoker {
    pub fn new(commands: BTreeMap<String, String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            commands,
            working_dir: working_dir.into(),
        }
    }
}

/// Build a platform-appropriate shell command.
fn shell_command(cmd_str: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", cmd_str]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_str);
        c
    }
}

impl StaticInvoker for ShellInvoker {
    fn invoke_static(&mut self, qualified_method: &str) -> pkgsync_core::Result<()> {
        let command = self
            .commands
            .get(qualified_method)
            .ok_or_else(|| Error::InvocationNotFound {
                method: qualified_method.to_string(),
            })?;

        tracing::debug!(method = qualified_method, command = %command, "Running action");
        let status = shell_command(command)
            .current_dir(&self.working_dir)
            .env("PKGSYNC_METHOD", qualified_method)
            .env("PKGSYNC_PROJECT", &self.working_dir)
            .status()
            .map_err(|e| Error::Invocation {
                method: qualified_method.to_string(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Invocation {
                method: qualified_method.to_string(),
                message: format!("command exited with {}", status),
            })
        }
    }
}

/// The CLI never reloads code, so the reload lock is only logged.
pub struct NoReload;

impl ReloadHost for NoReload {
    fn lock_reload(&self) {
        tracing::debug!("Reload lock acquired");
    }

    fn unlock_reload(&self) {
        tracing::debug!("Reload lock released");
    }
}
