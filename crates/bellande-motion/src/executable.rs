//! Local `Bellande_Motion_Probability` executable

use crate::errors::MotionError;
use crate::types::MotionRequest;
use bellande_logger as logger;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "Bellande_Motion_Probability.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "Bellande_Motion_Probability";

/// First argument the executable expects
pub const EXECUTABLE_PASSCODE: &str = "bellande_motion_probability_executable_access_key";

/// Find the executable: configured path, then `PATH`, then next to the running binary
pub fn locate_executable(configured: Option<&Path>) -> Result<PathBuf, MotionError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(MotionError::ExecutableNotFound(path.display().to_string()));
    }

    if let Ok(path) = which::which(EXECUTABLE_NAME) {
        return Ok(path);
    }

    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(EXECUTABLE_NAME)));
    match sibling {
        Some(path) if path.is_file() => Ok(path),
        _ => Err(MotionError::ExecutableNotFound(format!(
            "{} (set executable-path or add it to PATH)",
            EXECUTABLE_NAME
        ))),
    }
}

/// Positional arguments: passcode, state, poses, noise, radius, sample count
pub fn executable_args(request: &MotionRequest) -> Result<Vec<String>, MotionError> {
    Ok(vec![
        EXECUTABLE_PASSCODE.to_string(),
        serde_json::to_string(&request.particle_state)?,
        serde_json::to_string(&request.previous_pose)?,
        serde_json::to_string(&request.current_pose)?,
        serde_json::to_string(&request.noise_params)?,
        request.search_radius.to_string(),
        request.sample_points.to_string(),
    ])
}

/// Run the executable and return its stdout
pub fn run_executable(executable: &Path, request: &MotionRequest) -> Result<String, MotionError> {
    request.validate()?;
    let args = executable_args(request)?;
    debug!("Running {:?}", executable);

    let output = Command::new(executable).args(&args).output()?;
    logger::capture_output(EXECUTABLE_NAME, &output);

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(MotionError::ProcessFailed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_request() -> MotionRequest {
        MotionRequest::from_json_args("[0, 0, 0, 1]", "[0, 0, 0]", "[3, 4, 90]", None, 25.0, 8)
            .unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(EXECUTABLE_NAME);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).ok();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).ok();
        path
    }

    #[test]
    fn test_executable_args_order() {
        let args = executable_args(&sample_request()).unwrap_or_default();
        assert_eq!(args.len(), 7);
        assert_eq!(args[0], EXECUTABLE_PASSCODE);
        assert_eq!(args[1], "[0.0,0.0,0.0,1.0]");
        assert_eq!(args[3], "[3.0,4.0,90.0]");
        assert!(args[4].contains("\"trans_sigma\":0.1"));
        assert_eq!(args[5], "25");
        assert_eq!(args[6], "8");
    }

    #[test]
    fn test_configured_path_must_exist() {
        let missing = Path::new("/tmp/no_such_dir_bellande/Bellande_Motion_Probability");
        assert!(matches!(
            locate_executable(Some(missing)),
            Err(MotionError::ExecutableNotFound(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_executable_success() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let script = write_script(temp_dir.path(), "echo \"$1 $7\"");
        assert!(locate_executable(Some(&script)).is_ok());

        let output = run_executable(&script, &sample_request());
        assert!(output.is_ok_and(|out| out.trim() == format!("{} 8", EXECUTABLE_PASSCODE)));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_executable_failure_reports_stderr() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let script = write_script(temp_dir.path(), "echo 'bad passcode' >&2\nexit 3");
        let result = run_executable(&script, &sample_request());
        assert!(matches!(
            result,
            Err(MotionError::ProcessFailed { status: Some(3), ref stderr }) if stderr == "bad passcode"
        ));
    }
}
