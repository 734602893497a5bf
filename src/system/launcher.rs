// src/system/launcher.rs

use dunce;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("No launcher is available for this project.")]
    EmptyExecutable,
    #[error("Launcher '{0}' could not be started: {1}")]
    SpawnFailed(String, std::io::Error),
}

/// Everything needed to open one project in an IDE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub executable: String,
    pub project_path: String,
    pub working_dir: Option<PathBuf>,
    /// Ask the OS to run the launcher with administrator rights.
    pub elevated: bool,
}

impl LaunchRequest {
    /// A request whose working directory is the project directory (or the
    /// parent of a project file such as a `.sln`) when that exists.
    pub fn new(executable: impl Into<String>, project_path: impl Into<String>, elevated: bool) -> Self {
        let project_path = project_path.into();
        let working_dir = working_dir_for(Path::new(&project_path));
        Self {
            executable: executable.into(),
            project_path,
            working_dir,
            elevated,
        }
    }

    /// The project path in double quotes, as JetBrains launchers expect it.
    pub fn argument(&self) -> String {
        format!("\"{}\"", self.project_path)
    }

    /// A shell-quoted rendering of the request, for logs and dry runs.
    pub fn command_line(&self) -> String {
        shlex::try_join([self.executable.as_str(), self.project_path.as_str()])
            .unwrap_or_else(|_| format!("{} {}", self.executable, self.argument()))
    }
}

fn working_dir_for(project_path: &Path) -> Option<PathBuf> {
    if project_path.is_dir() {
        Some(dunce::simplified(project_path).to_path_buf())
    } else {
        project_path
            .parent()
            .filter(|parent| parent.is_dir())
            .map(|parent| dunce::simplified(parent).to_path_buf())
    }
}

/// Starts the launcher without waiting for it. Returns the child's PID.
pub fn launch(request: &LaunchRequest) -> Result<u32, LaunchError> {
    let executable = request.executable.trim();
    if executable.is_empty() {
        return Err(LaunchError::EmptyExecutable);
    }

    let mut command = if request.elevated && cfg!(target_os = "windows") {
        elevated_command(executable, &request.argument())
    } else {
        if request.elevated {
            log::warn!("Elevated launch is only supported on Windows; starting normally.");
        }
        let mut command = StdCommand::new(executable);
        command.arg(&request.project_path);
        command
    };

    if let Some(dir) = &request.working_dir {
        command.current_dir(dir);
    }

    log::info!("Launching {}", request.command_line());
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| LaunchError::SpawnFailed(executable.to_string(), e))?;

    log::debug!("Launcher started (PID: {})", child.id());
    Ok(child.id())
}

/// `Start-Process -Verb RunAs` is the PowerShell spelling of the `runas` shell verb.
fn elevated_command(executable: &str, argument: &str) -> StdCommand {
    let script = format!(
        "Start-Process -FilePath '{}' -ArgumentList '{}' -Verb RunAs",
        executable.replace('\'', "''"),
        argument.replace('\'', "''")
    );
    let mut command = StdCommand::new("powershell");
    command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    command
}
