//! Server process launching and supervision
//!
//! The launcher spawns the java runtime for a provisioned installation and
//! returns a [`RunningInstance`] owning the child process. An interrupt relay
//! is registered before the launcher returns: a SIGINT delivered to the
//! supervising process is forwarded to the child, so the server gets a chance
//! to shut down cleanly when the embedding application is interrupted. The
//! relay is scoped to the instance and deregistered when it is dropped, not
//! left behind as a standing global handler.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{Error, Result};
use crate::types::SERVER_FILE;

/// Builds the runtime argument vector and spawns server processes
///
/// # Examples
///
/// ```no_run
/// use craft_dl::launch::Launcher;
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let launcher = Launcher::new(
///     PathBuf::from("java"),
///     vec!["-Xmx2G".into(), "-Xms2G".into()],
///     vec!["nogui".into()],
/// );
/// let mut instance = launcher.launch(Path::new("./server"))?;
/// let status = instance.wait().await?;
/// println!("server exited: {status}");
/// # Ok(())
/// # }
/// ```
pub struct Launcher {
    java: PathBuf,
    java_args: Vec<String>,
    server_args: Vec<String>,
}

impl Launcher {
    /// Create a launcher with the given java executable and argument sets
    #[must_use]
    pub fn new(java: PathBuf, java_args: Vec<String>, server_args: Vec<String>) -> Self {
        Self {
            java,
            java_args,
            server_args,
        }
    }

    /// Start the server in `directory` and return a handle to it
    ///
    /// Spawns `java {java_args} -jar server.jar {server_args}` with the
    /// installation directory as working directory and inherited standard I/O.
    /// Does not wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error when the java executable cannot be spawned.
    pub fn launch(&self, directory: &Path) -> Result<RunningInstance> {
        let server_jar = directory.join(SERVER_FILE);

        info!(
            java = %self.java.display(),
            jar = %server_jar.display(),
            "starting server"
        );

        let child = Command::new(&self.java)
            .args(&self.java_args)
            .arg("-jar")
            .arg(&server_jar)
            .args(&self.server_args)
            .current_dir(directory)
            .spawn()
            .map_err(|e| Error::filesystem(&self.java, e))?;

        // Register the relay before handing the instance back, so an early
        // interrupt is never lost between launch and supervision.
        let relay = spawn_interrupt_relay(child.id());

        Ok(RunningInstance {
            child,
            directory: directory.to_path_buf(),
            relay,
        })
    }
}

/// A live, supervised server process
///
/// Owns the child process and the installation directory it runs in. Dropping
/// the instance deregisters the interrupt relay but does not kill the server.
#[derive(Debug)]
pub struct RunningInstance {
    child: Child,
    directory: PathBuf,
    relay: Option<JoinHandle<()>>,
}

impl RunningInstance {
    /// OS process id of the server, if it is still running
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// The installation directory the server runs in
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Wait for the server to exit and return its exit status
    ///
    /// # Errors
    ///
    /// Returns a filesystem error when waiting on the child fails.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| Error::filesystem(&self.directory, e))?;
        self.stop_relay();
        Ok(status)
    }

    /// Kill the server process
    ///
    /// # Errors
    ///
    /// Returns a filesystem error when the kill signal cannot be delivered.
    pub async fn kill(&mut self) -> Result<()> {
        self.child
            .kill()
            .await
            .map_err(|e| Error::filesystem(&self.directory, e))?;
        self.stop_relay();
        Ok(())
    }

    fn stop_relay(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }
}

impl Drop for RunningInstance {
    fn drop(&mut self) {
        self.stop_relay();
    }
}

/// Forward interrupts from the supervising process to the child
///
/// Returns `None` when no relay could be registered; the launch still
/// proceeds, the server just will not see forwarded interrupts.
#[cfg(unix)]
fn spawn_interrupt_relay(pid: Option<u32>) -> Option<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};
    use tracing::warn;

    let Some(pid) = pid else {
        return None;
    };

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "could not register interrupt relay");
            return None;
        }
    };

    Some(tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            info!(pid, "forwarding interrupt to server process");
            // SAFETY: plain kill(2) on a pid we spawned; no memory involved
            unsafe {
                libc::kill(pid as i32, libc::SIGINT);
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_interrupt_relay(pid: Option<u32>) -> Option<JoinHandle<()>> {
    let _ = pid;
    Some(tokio::spawn(async move {
        // Console process groups already deliver Ctrl+C to the child on
        // non-unix platforms; just record that it happened.
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; child shares the console event");
        }
    }))
}
