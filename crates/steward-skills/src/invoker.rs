//! Supervised capability invocation.

use crate::capability::Capability;
use crate::error::{CapabilityError, CapabilityResult};
use crate::request::build_request;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use steward_config::CapabilitySettings;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

/// Runs a capability with a set of context files.
///
/// `Ok` carries the capability's output, `Err` the reason it failed. With
/// `dry_run` set, implementations must not perform any external call.
#[async_trait]
pub trait CapabilityRunner: Send + Sync {
    /// Invoke the capability defined at `capability`.
    async fn invoke(
        &self,
        capability: &Path,
        context: &[PathBuf],
        working_dir: &Path,
        dry_run: bool,
    ) -> CapabilityResult<String>;
}

/// Deterministic description of a call that dry-run skipped.
pub fn dry_run_message(capability: &Path, context: &[PathBuf]) -> String {
    let names: Vec<String> = context
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    let capability = capability
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| capability.display().to_string());
    format!(
        "[DRY_RUN] Would invoke capability={}, context=[{}]",
        capability,
        names.join(", ")
    )
}

/// Runs capabilities as a child process of the configured program.
///
/// The request is passed as `--print -p <request>` with the permitted
/// operations in `--allowedTools`; any configured `args` come first. The
/// child runs in the vault root with stdin closed. On Unix it leads its own
/// process group, and on timeout the whole group is killed and the child
/// reaped before the call returns.
#[derive(Debug, Clone)]
pub struct CapabilityInvoker {
    program: String,
    args: Vec<String>,
    allowed_tools: Vec<String>,
    timeout: Duration,
}

impl CapabilityInvoker {
    /// Create an invoker for `program` with the default allow-list and timeout.
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = CapabilitySettings::default();
        Self {
            program: program.into(),
            args: defaults.args,
            allowed_tools: defaults.allowed_tools,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    /// Create an invoker from configuration.
    pub fn from_settings(settings: &CapabilitySettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            allowed_tools: settings.allowed_tools.clone(),
            timeout: settings.timeout(),
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra arguments placed before the request.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Program that is spawned.
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_process(
        &self,
        request: &str,
        tools: &[String],
        working_dir: &Path,
    ) -> CapabilityResult<String> {
        if !working_dir.is_dir() {
            return Err(CapabilityError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("working directory {} does not exist", working_dir.display()),
            )));
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--print")
            .arg("-p")
            .arg(request)
            .arg("--allowedTools")
            .arg(tools.join(","))
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        own_process_group(&mut command);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CapabilityError::ExecutableNotFound {
                    program: self.program.clone(),
                }
            } else {
                CapabilityError::Spawn(e)
            }
        })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            CapabilityError::Io(std::io::Error::other("child stdout was not captured"))
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            CapabilityError::Io(std::io::Error::other("child stderr was not captured"))
        })?;

        let mut out = Vec::new();
        let mut err = Vec::new();
        let finished = tokio::time::timeout(self.timeout, async {
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
            )?;
            Ok::<_, std::io::Error>(status)
        })
        .await;

        let status = match finished {
            Ok(result) => result?,
            Err(_) => {
                terminate(&mut child).await;
                return Err(CapabilityError::TimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(CapabilityError::NonZeroExit {
                code: status.code(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kill the child and anything it started, then reap it.
async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        kill_process_group(pid);
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to kill timed out capability process: {}", e);
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the child leads group `pgid`
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            "killpg({}) failed: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

#[async_trait]
impl CapabilityRunner for CapabilityInvoker {
    async fn invoke(
        &self,
        capability: &Path,
        context: &[PathBuf],
        working_dir: &Path,
        dry_run: bool,
    ) -> CapabilityResult<String> {
        if dry_run {
            let message = dry_run_message(capability, context);
            info!("{}", message);
            return Ok(message);
        }

        let definition = Capability::load(capability)?;
        let request = build_request(&definition, context, working_dir);
        let tools = definition.permitted_tools(&self.allowed_tools);
        debug!(
            "Invoking {} for capability {} ({} bytes, tools={:?})",
            self.program,
            definition.name,
            request.len(),
            tools
        );

        let result = self.run_process(&request, &tools, working_dir).await;
        match &result {
            Ok(_) => info!("Capability {} succeeded", definition.name),
            Err(CapabilityError::ExecutableNotFound { program }) => {
                error!("{} not found. Is it installed and on PATH?", program)
            }
            Err(e) => error!("Capability {} failed: {}", definition.name, e),
        }
        result
    }
}
