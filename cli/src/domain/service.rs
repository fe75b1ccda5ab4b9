//! Service installation model: layout, init-system families, descriptor
//! templates and package-ownership parsing.
//!
//! Pure functions only. Probing the host and running commands happens in
//! `application::services`.

use std::fmt;
use std::path::{Path, PathBuf};

// ── Constants ─────────────────────────────────────────────────────────────────

pub const BIN_FILE_NAME: &str = "rexray";
pub const UNIT_FILE_NAME: &str = "rexray.service";
/// Environment variable naming the installation prefix.
pub const PREFIX_ENV: &str = "REXRAY_HOME";

pub const UNIT_DIR: &str = "/etc/systemd/system";
pub const INIT_DIR: &str = "/etc/init.d";
pub const DOCKER_WANTS_DIR: &str = "/etc/systemd/system/docker.service.wants";
/// Serializes concurrent install and uninstall runs on this host.
pub const INSTALL_LOCK_FILE: &str = "/run/lock/rexray.install.lock";

// ── Init systems ──────────────────────────────────────────────────────────────

/// Init-system family, probed at runtime. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitSystemKind {
    Unknown,
    SystemD,
    UpdateRcD,
    ChkConfig,
}

impl InitSystemKind {
    /// Probe order; the first tool found on the search path wins.
    pub const PROBE_ORDER: [(&'static str, Self); 3] = [
        ("systemctl", Self::SystemD),
        ("update-rc.d", Self::UpdateRcD),
        ("chkconfig", Self::ChkConfig),
    ];

    #[must_use]
    pub fn detect(has_executable: impl Fn(&str) -> bool) -> Self {
        Self::PROBE_ORDER
            .iter()
            .find(|(tool, _)| has_executable(tool))
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            Self::SystemD => "systemd",
            Self::UpdateRcD => "update-rc.d",
            Self::ChkConfig => "chkconfig",
            Self::Unknown => "unknown",
        }
    }

    /// SysV families share the init script descriptor.
    #[must_use]
    pub fn uses_init_script(self) -> bool {
        matches!(self, Self::UpdateRcD | Self::ChkConfig)
    }

    #[must_use]
    pub fn registration_command(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Self::SystemD => Some(("systemctl", &["enable", "-q", UNIT_FILE_NAME])),
            Self::UpdateRcD => Some(("update-rc.d", &[BIN_FILE_NAME, "defaults"])),
            Self::ChkConfig => Some(("chkconfig", &[BIN_FILE_NAME, "on"])),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub fn deregistration_command(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Self::SystemD => Some(("systemctl", &["disable", "-q", UNIT_FILE_NAME])),
            Self::UpdateRcD => Some(("update-rc.d", &[BIN_FILE_NAME, "remove"])),
            Self::ChkConfig => Some(("chkconfig", &["--del", BIN_FILE_NAME])),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for InitSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}

/// Operations forwarded to the installed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOp {
    Start,
    Stop,
    Restart,
    Status,
}

impl ServiceOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Status => "status",
        }
    }

    /// Past tense used in the privilege error, or `None` when unprivileged.
    #[must_use]
    pub fn privileged_as(self) -> Option<&'static str> {
        match self {
            Self::Start => Some("started"),
            Self::Stop => Some("stopped"),
            Self::Restart => Some("restarted"),
            Self::Status => None,
        }
    }
}

// ── Ownership ─────────────────────────────────────────────────────────────────

/// Who owns the installed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationOwnership {
    Unmanaged,
    RpmManaged(String),
    DebManaged(String),
}

/// Parses `rpm -qf <path>` stdout into a package name.
#[must_use]
pub fn parse_rpm_owner(stdout: &str) -> Option<String> {
    let pkg = stdout.trim();
    if pkg.is_empty() || pkg.contains(char::is_whitespace) {
        return None;
    }
    Some(pkg.to_string())
}

/// Parses `dpkg-query -S <path>` stdout (`pkg[, pkg...]: /path`) into a
/// package name. With several owners the first one listed is used.
#[must_use]
pub fn parse_dpkg_owner(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?;
    let (owners, _) = first.split_once(": ")?;
    let pkg = owners.split(',').next()?.trim();
    if pkg.is_empty() || pkg.contains(char::is_whitespace) {
        return None;
    }
    Some(pkg.to_string())
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Installation paths, optionally rooted at a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallLayout {
    prefix: Option<PathBuf>,
}

impl InstallLayout {
    /// Empty and `/` mean "not prefixed".
    #[must_use]
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(str::trim)
            .filter(|p| !p.trim_end_matches('/').is_empty())
            .map(|p| PathBuf::from(p.trim_end_matches('/')));
        Self { prefix }
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&Path> {
        self.prefix.as_deref()
    }

    #[must_use]
    pub fn is_prefixed(&self) -> bool {
        self.prefix.is_some()
    }

    fn under_prefix(&self, rel: &str) -> PathBuf {
        match &self.prefix {
            Some(p) => p.join(rel),
            None => Path::new("/").join(rel),
        }
    }

    #[must_use]
    pub fn bin_file_path(&self) -> PathBuf {
        self.under_prefix("usr/bin").join(BIN_FILE_NAME)
    }

    #[must_use]
    pub fn etc_dir(&self) -> PathBuf {
        self.under_prefix("etc/rexray")
    }

    #[must_use]
    pub fn env_file_path(&self) -> PathBuf {
        self.etc_dir().join("rexray.env")
    }

    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.etc_dir().join("config.yml")
    }

    #[must_use]
    pub fn unit_file_path(&self) -> PathBuf {
        Path::new(UNIT_DIR).join(UNIT_FILE_NAME)
    }

    #[must_use]
    pub fn init_file_path(&self) -> PathBuf {
        Path::new(INIT_DIR).join(BIN_FILE_NAME)
    }

    #[must_use]
    pub fn docker_wants_link(&self) -> PathBuf {
        Path::new(DOCKER_WANTS_DIR).join(UNIT_FILE_NAME)
    }

    /// Foreground daemon invocation run by the service. The daemon itself is
    /// a separate build of the binary.
    #[must_use]
    pub fn daemon_command(&self) -> String {
        format!("{} start -f", self.bin_file_path().display())
    }

    /// Host-wide, independent of the prefix: the descriptors it guards are too.
    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        PathBuf::from(INSTALL_LOCK_FILE)
    }

    /// The descriptor written for `kind`, if any.
    #[must_use]
    pub fn descriptor_path(&self, kind: InitSystemKind) -> Option<PathBuf> {
        match kind {
            InitSystemKind::SystemD => Some(self.unit_file_path()),
            InitSystemKind::UpdateRcD | InitSystemKind::ChkConfig => Some(self.init_file_path()),
            InitSystemKind::Unknown => None,
        }
    }

    /// The shell command an operator runs to start the service.
    #[must_use]
    pub fn start_hint(&self, kind: InitSystemKind) -> Option<String> {
        match kind {
            InitSystemKind::SystemD => Some(format!("sudo systemctl start {BIN_FILE_NAME}")),
            InitSystemKind::UpdateRcD | InitSystemKind::ChkConfig => {
                Some(format!("sudo {} start", self.init_file_path().display()))
            }
            InitSystemKind::Unknown => None,
        }
    }
}

// ── Templates ─────────────────────────────────────────────────────────────────

#[must_use]
pub fn render_unit_file(layout: &InstallLayout) -> String {
    format!(
        "[Unit]\n\
         Description={name}\n\
         Before=docker.service\n\
         \n\
         [Service]\n\
         EnvironmentFile={env}\n\
         ExecStart={exec}\n\
         ExecReload=/bin/kill -HUP $MAINPID\n\
         KillMode=process\n\
         \n\
         [Install]\n\
         WantedBy=docker.service\n\
         Wants=scini.service\n\
         Before=docker.service\n\
         After=scini.service\n",
        name = BIN_FILE_NAME,
        env = layout.env_file_path().display(),
        exec = layout.daemon_command(),
    )
}

#[must_use]
pub fn render_init_script(layout: &InstallLayout) -> String {
    format!(
        "### BEGIN INIT INFO\n\
         # Provides:          {name}\n\
         # Required-Start:    $remote_fs $syslog\n\
         # Required-Stop:     $remote_fs $syslog\n\
         # Should-Start:      scini\n\
         # X-Start-Before:    docker\n\
         # Default-Start:     2 3 4 5\n\
         # Default-Stop:      0 1 6\n\
         # Short-Description: Start daemon at boot time\n\
         # Description:       Enable service provided by daemon.\n\
         ### END INIT INFO\n\
         \n\
         case \"$1\" in\n\
         \x20 start)\n\
         \x20   {bin} start\n\
         \x20   ;;\n\
         \x20 stop)\n\
         \x20   {bin} stop\n\
         \x20   ;;\n\
         \x20 status)\n\
         \x20   {bin} status\n\
         \x20   ;;\n\
         \x20 restart)\n\
         \x20   {bin} restart\n\
         \x20   ;;\n\
         \x20 reload)\n\
         \x20   {bin} reload\n\
         \x20   ;;\n\
         \x20 force-reload)\n\
         \x20   {bin} force-reload\n\
         \x20   ;;\n\
         \x20 *)\n\
         \x20   echo \"Usage: $0 {{start|stop|status|restart|reload|force-reload}}\"\n\
         esac\n",
        name = BIN_FILE_NAME,
        bin = layout.bin_file_path().display(),
    )
}

/// Companion environment file. Empty unless prefixed.
#[must_use]
pub fn render_env_file(layout: &InstallLayout) -> String {
    match layout.prefix() {
        Some(p) => format!("{PREFIX_ENV}={}\n", p.display()),
        None => String::new(),
    }
}
