//! Shared test helpers: hand-written port mocks and output constructors.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rexray_cli::application::ports::{
    CommandRunner, HostProbe, IdentityProbe, KnownHostsStore, LocalFs, ProgressReporter,
    TrustPrompt,
};
use rexray_cli::domain::{Endpoint, KnownHosts, PendingIdentity, TrustedHostEntry};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// Records every command line. Responses are matched by command-line prefix;
/// anything unmatched succeeds with empty output.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    responses: Vec<(String, Output)>,
    spawn_failures: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, output: Output) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    /// Commands starting with `prefix` fail to spawn.
    pub fn fail_spawn(mut self, prefix: &str) -> Self {
        self.spawn_failures.push(prefix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == command).count()
    }

    fn dispatch(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("lock").push(line.clone());
        if self.spawn_failures.iter().any(|p| line.starts_with(p.as_str())) {
            anyhow::bail!("failed to spawn {program}");
        }
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or_else(|| ok_output(b""), |(_, out)| out.clone()))
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.dispatch(program, args)
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: std::time::Duration,
    ) -> Result<Output> {
        self.dispatch(program, args)
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        self.dispatch(program, args).map(|o| o.status)
    }
}

// ── Filesystem ───────────────────────────────────────────────────────────────

/// In-memory `LocalFs`: files with their mode, plus created directories.
/// Lock, unlock, write and remove calls are journaled in order.
#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<BTreeMap<PathBuf, (String, u32)>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    read_only: Vec<PathBuf>,
    journal: Arc<Mutex<Vec<String>>>,
}

/// Lock guard handed out by [`MemoryFs`]; journals `unlock` when dropped.
pub struct MemoryLock {
    path: PathBuf,
    journal: Arc<Mutex<Vec<String>>>,
}

impl Drop for MemoryLock {
    fn drop(&mut self) {
        self.journal
            .lock()
            .expect("lock")
            .push(format!("unlock {}", self.path.display()));
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .expect("lock")
            .insert(PathBuf::from(path), (content.to_string(), 0o644));
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.dirs.lock().expect("lock").insert(PathBuf::from(path));
        self
    }

    /// Writes and removals of `path` fail.
    pub fn read_only(mut self, path: &str) -> Self {
        self.read_only.push(PathBuf::from(path));
        self
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.lock().expect("lock").get(Path::new(path)).map(|(c, _)| c.clone())
    }

    pub fn mode(&self, path: &str) -> Option<u32> {
        self.files.lock().expect("lock").get(Path::new(path)).map(|(_, m)| *m)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().expect("lock").len()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.lock().expect("lock").contains(Path::new(path))
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("lock").clone()
    }

    fn record(&self, op: &str, path: &Path) {
        self.journal
            .lock()
            .expect("lock")
            .push(format!("{op} {}", path.display()));
    }

    fn guard(&self, path: &Path) -> Result<()> {
        if self.read_only.iter().any(|p| p == path) {
            anyhow::bail!("permission denied: {}", path.display());
        }
        Ok(())
    }
}

impl LocalFs for MemoryFs {
    type Lock = MemoryLock;

    fn lock_exclusive(&self, path: &Path) -> Result<MemoryLock> {
        self.guard(path)?;
        self.record("lock", path);
        Ok(MemoryLock {
            path: path.to_path_buf(),
            journal: Arc::clone(&self.journal),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock").contains_key(path)
            || self.dirs.lock().expect("lock").contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs.lock().expect("lock").insert(path.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.guard(path)?;
        self.record("remove", path);
        self.files.lock().expect("lock").retain(|p, _| !p.starts_with(path));
        self.dirs.lock().expect("lock").retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.guard(path)?;
        self.record("remove", path);
        self.files
            .lock()
            .expect("lock")
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| anyhow::anyhow!("removing file {}: not found", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.guard(path)?;
        self.record("write", path);
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), (content.to_string(), 0o644));
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        let mut files = self.files.lock().expect("lock");
        let entry = files
            .get_mut(path)
            .ok_or_else(|| anyhow::anyhow!("chmod {}: not found", path.display()))?;
        entry.1 = mode;
        Ok(())
    }
}

// ── Host ─────────────────────────────────────────────────────────────────────

pub struct FakeHost {
    pub tools: Vec<&'static str>,
    pub linux: bool,
    pub root: bool,
}

impl FakeHost {
    /// A root Linux host with the given init tools on the search path.
    pub fn linux_root(tools: &[&'static str]) -> Self {
        Self {
            tools: tools.to_vec(),
            linux: true,
            root: true,
        }
    }
}

impl HostProbe for FakeHost {
    fn has_executable(&self, program: &str) -> bool {
        self.tools.contains(&program)
    }

    fn is_linux(&self) -> bool {
        self.linux
    }

    fn is_elevated(&self) -> bool {
        self.root
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.lock().expect("lock").push(message.to_string());
    }
    fn success(&self, _: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }
}

// ── Host trust ───────────────────────────────────────────────────────────────

/// In-memory `KnownHostsStore`.
pub struct MemoryStore {
    path: PathBuf,
    hosts: Mutex<KnownHosts>,
    fail_add: bool,
    add_calls: Mutex<u32>,
}

impl MemoryStore {
    pub fn new(content: &str) -> Self {
        Self {
            path: PathBuf::from("/home/op/.rexray/known_hosts"),
            hosts: Mutex::new(KnownHosts::parse(content).expect("valid store")),
            fail_add: false,
            add_calls: Mutex::new(0),
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub fn snapshot(&self) -> KnownHosts {
        self.hosts.lock().expect("lock").clone()
    }

    pub fn add_count(&self) -> u32 {
        *self.add_calls.lock().expect("lock")
    }
}

impl KnownHostsStore for MemoryStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<KnownHosts> {
        Ok(self.snapshot())
    }

    fn add(&self, entry: &TrustedHostEntry) -> Result<()> {
        *self.add_calls.lock().expect("lock") += 1;
        if self.fail_add {
            anyhow::bail!("read-only file system");
        }
        self.hosts.lock().expect("lock").insert(entry.clone())?;
        Ok(())
    }
}

/// Answers every trust prompt with a fixed choice and counts the prompts.
pub struct FixedPrompt {
    answer: bool,
    asked: Mutex<u32>,
}

impl FixedPrompt {
    pub fn accept() -> Self {
        Self {
            answer: true,
            asked: Mutex::new(0),
        }
    }

    pub fn refuse() -> Self {
        Self {
            answer: false,
            asked: Mutex::new(0),
        }
    }

    pub fn asked(&self) -> u32 {
        *self.asked.lock().expect("lock")
    }
}

impl TrustPrompt for FixedPrompt {
    fn confirm_new_host(&self, _: &PendingIdentity) -> Result<bool> {
        *self.asked.lock().expect("lock") += 1;
        Ok(self.answer)
    }
}

/// Presents a fixed identity for every endpoint.
pub struct FixedProbe(pub PendingIdentity);

impl IdentityProbe for FixedProbe {
    async fn fetch_identity(&self, _: &Endpoint) -> Result<PendingIdentity> {
        Ok(self.0.clone())
    }
}

/// Fails every probe.
pub struct UnreachableProbe;

impl IdentityProbe for UnreachableProbe {
    async fn fetch_identity(&self, endpoint: &Endpoint) -> Result<PendingIdentity> {
        anyhow::bail!("connection refused: {endpoint}")
    }
}

pub fn identity(host: &str, fingerprint: &str) -> PendingIdentity {
    PendingIdentity::new(host, "sha256", fingerprint.parse().expect("fingerprint"))
}
