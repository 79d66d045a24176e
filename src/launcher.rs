//! Playwright server launcher
//!
//! Starts the external Playwright HTTP server as a child process, reports
//! the port it listens on and stops it again on SIGINT/SIGTERM. There is no
//! supervision: if the server exits by itself the launcher returns its
//! exit status.

use crate::error::{LaunchError, Result};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

/// Environment variable the server reads its port from
pub const PORT_ENV_VAR: &str = "PORT";

/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3102;

/// Server entry point, relative to the working directory
pub const DEFAULT_SERVER_SCRIPT: &str = "dist/server/playwright-server.js";

/// Configuration for launching the Playwright server
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Interpreter or executable to run (default: node)
    pub program: String,
    /// Server entry script passed as first argument
    pub script: PathBuf,
    /// Port exported to the server as `PORT` (default: 3102)
    pub port: u16,
    /// Pass `--headless` to the server (default: false)
    pub headless: bool,
    /// Additional server arguments
    pub extra_args: Vec<String>,
    /// How long `stop` waits after SIGTERM before killing (default: 5s)
    pub stop_grace: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            script: PathBuf::from(DEFAULT_SERVER_SCRIPT),
            port: DEFAULT_PORT,
            headless: false,
            extra_args: Vec::new(),
            stop_grace: Duration::from_secs(5),
        }
    }
}

impl LaunchConfig {
    /// Create a new config builder
    pub fn builder() -> LaunchConfigBuilder {
        LaunchConfigBuilder::default()
    }
}

/// Builder for LaunchConfig
#[derive(Default)]
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    /// Set the program to execute
    pub fn program<S: Into<String>>(mut self, program: S) -> Self {
        self.config.program = program.into();
        self
    }

    /// Set the server entry script
    pub fn script<P: Into<PathBuf>>(mut self, script: P) -> Self {
        self.config.script = script.into();
        self
    }

    /// Set the listening port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Run the browser headless
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Add an extra server argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Set the SIGTERM grace period
    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.config.stop_grace = grace;
        self
    }

    /// Build the config
    pub fn build(self) -> LaunchConfig {
        self.config
    }
}

/// Signal that ended [`ServerLauncher::run_until_signal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// How [`ServerLauncher::run_until_signal`] ended
#[derive(Debug)]
pub enum RunOutcome {
    /// A shutdown signal arrived and the server was stopped
    Stopped(ShutdownSignal),
    /// The server process exited on its own
    Exited(ExitStatus),
}

/// Owns the Playwright server child process
pub struct ServerLauncher {
    config: LaunchConfig,
    child: Option<Child>,
}

impl ServerLauncher {
    /// Create a launcher; nothing is spawned until [`start`](Self::start)
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    /// Launch configuration
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Port the server is told to listen on
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Local URL of the server
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }

    /// PID of the running server, if any
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    /// Whether a child process has been started and not yet reaped
    pub fn is_running(&self) -> bool {
        self.pid().is_some()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg(&self.config.script)
            .args(&self.config.extra_args)
            .env(PORT_ENV_VAR, self.config.port.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if self.config.headless {
            cmd.arg("--headless");
        }

        cmd
    }

    /// Spawn the server process
    #[instrument(skip(self), fields(program = %self.config.program, port = self.config.port))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            warn!("Server already running (pid {:?})", self.pid());
            return Ok(());
        }

        let child = self.command().spawn().map_err(|source| LaunchError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;

        info!(pid = ?child.id(), "Playwright server process started");
        self.child = Some(child);
        Ok(())
    }

    /// Wait for the server to exit by itself
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let child = self.child.as_mut().ok_or(LaunchError::NotRunning)?;
        let status = child.wait().await?;
        self.child = None;
        Ok(status)
    }

    /// Stop the server: SIGTERM, then kill after the grace period
    ///
    /// Stopping a launcher that is not running is a no-op.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            debug!("Stop requested but no server is running");
            return Ok(());
        };

        if let Some(status) = child.try_wait()? {
            info!("Server already exited with {}", status);
            return Ok(());
        }

        request_terminate(&mut child)?;

        match tokio::time::timeout(self.config.stop_grace, child.wait()).await {
            Ok(status) => {
                info!("Server stopped with {}", status?);
            }
            Err(_) => {
                warn!(
                    "Server did not exit within {:?}, killing",
                    self.config.stop_grace
                );
                child
                    .kill()
                    .await
                    .map_err(|e| LaunchError::Stop(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Start the server, then block until a shutdown signal or server exit
    ///
    /// On SIGINT or SIGTERM the server is stopped before returning.
    pub async fn run_until_signal(&mut self) -> Result<RunOutcome> {
        self.start().await?;
        println!(
            "Better Playwright HTTP server started on {}",
            self.url()
        );

        let outcome = {
            let child = self.child.as_mut().ok_or(LaunchError::NotRunning)?;
            tokio::select! {
                signal = shutdown_signal() => RunOutcome::Stopped(signal?),
                status = child.wait() => RunOutcome::Exited(status?),
            }
        };

        match outcome {
            RunOutcome::Stopped(signal) => {
                info!("Received {}", signal);
                if signal == ShutdownSignal::Interrupt {
                    println!("\nShutting down...");
                }
                self.stop().await?;
            }
            RunOutcome::Exited(status) => {
                warn!("Playwright server exited on its own with {}", status);
                self.child = None;
            }
        }

        Ok(outcome)
    }
}

#[cfg(unix)]
fn request_terminate(child: &mut Child) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| LaunchError::Stop(format!("SIGTERM to PID {}: {}", pid, e)))?;
    debug!("Sent SIGTERM to PID {}", pid);
    Ok(())
}

#[cfg(not(unix))]
fn request_terminate(child: &mut Child) -> Result<()> {
    child
        .start_kill()
        .map_err(|e| LaunchError::Stop(e.to_string()))?;
    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM
#[cfg(unix)]
pub async fn shutdown_signal() -> Result<ShutdownSignal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| LaunchError::SignalSetup(e.to_string()))?;
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| LaunchError::SignalSetup(e.to_string()))?;

    tokio::select! {
        _ = sigint.recv() => Ok(ShutdownSignal::Interrupt),
        _ = sigterm.recv() => Ok(ShutdownSignal::Terminate),
    }
}

/// Resolve on Ctrl+C (the only signal available off Unix)
#[cfg(not(unix))]
pub async fn shutdown_signal() -> Result<ShutdownSignal> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| LaunchError::SignalSetup(e.to_string()))?;
    Ok(ShutdownSignal::Interrupt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_launch_config_default() {
        let config = LaunchConfig::default();
        assert_eq!(config.program, "node");
        assert_eq!(config.script, PathBuf::from(DEFAULT_SERVER_SCRIPT));
        assert_eq!(config.port, 3102);
        assert!(!config.headless);
        assert_eq!(config.stop_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_launch_config_builder() {
        let config = LaunchConfig::builder()
            .program("/usr/bin/node")
            .script("server.js")
            .port(3103)
            .headless(true)
            .arg("--trace")
            .stop_grace(Duration::from_millis(200))
            .build();

        assert_eq!(config.program, "/usr/bin/node");
        assert_eq!(config.port, 3103);
        assert!(config.headless);
        assert_eq!(config.extra_args, vec!["--trace"]);
        assert_eq!(config.stop_grace, Duration::from_millis(200));
    }

    #[test]
    fn test_command_line() {
        let launcher = ServerLauncher::new(
            LaunchConfig::builder()
                .script("server.js")
                .port(4000)
                .headless(true)
                .build(),
        );
        let cmd = launcher.command();
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "node");
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("server.js"), OsStr::new("--headless")]);
        let port = std_cmd
            .get_envs()
            .find(|(k, _)| *k == OsStr::new(PORT_ENV_VAR))
            .and_then(|(_, v)| v);
        assert_eq!(port, Some(OsStr::new("4000")));
        assert_eq!(launcher.url(), "http://localhost:4000");
    }

    #[test]
    fn test_shutdown_signal_display() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn test_stop_when_not_running_is_noop() {
        let mut launcher = ServerLauncher::new(LaunchConfig::default());
        assert!(!launcher.is_running());
        launcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_when_not_running() {
        let mut launcher = ServerLauncher::new(LaunchConfig::default());
        let err = launcher.wait().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Launch(LaunchError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let mut launcher = ServerLauncher::new(
            LaunchConfig::builder()
                .program("definitely-not-a-real-program-4c1d")
                .build(),
        );
        let err = launcher.start().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Launch(LaunchError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_terminates_running_process() {
        // `sleep 30` stands in for the server: the script slot carries the duration.
        let mut launcher = ServerLauncher::new(
            LaunchConfig::builder()
                .program("sleep")
                .script("30")
                .stop_grace(Duration::from_secs(2))
                .build(),
        );

        launcher.start().await.unwrap();
        assert!(launcher.is_running());

        launcher.stop().await.unwrap();
        assert!(!launcher.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wait_reports_exit_status() {
        let mut launcher =
            ServerLauncher::new(LaunchConfig::builder().program("true").script("ignored").build());

        launcher.start().await.unwrap();
        let status = launcher.wait().await.unwrap();
        assert!(status.success());
        assert!(!launcher.is_running());
    }
}
