use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::json;
use tracing::debug;

use super::{EngineError, Geoprocessor, Invocation};

/// Default executable name of the QGIS processing command-line runner
pub const DEFAULT_PROGRAM: &str = "qgis_process";

/// Runs algorithms through the `qgis_process` command-line tool
/// Parameters are sent as JSON on stdin: `qgis_process --json run <alg> -`
#[derive(Debug, Clone)]
pub struct QgisProcess {
    program: PathBuf,
}

impl QgisProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        QgisProcess {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn payload(invocation: &Invocation) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&json!({ "inputs": invocation.parameters }))?)
    }
}

impl Default for QgisProcess {
    fn default() -> Self {
        QgisProcess::new(DEFAULT_PROGRAM)
    }
}

impl Geoprocessor for QgisProcess {
    fn run(&mut self, invocation: &Invocation) -> Result<(), EngineError> {
        let program = self.program.to_string_lossy().into_owned();
        let payload = Self::payload(invocation)?;
        debug!(algorithm = invocation.algorithm, %payload, "qgis_process run");

        let spawn_error = |source| EngineError::Spawn {
            program: program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg("--json")
            .arg("run")
            .arg(invocation.algorithm)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // stdin is closed when the handle drops, which lets qgis_process start
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes()).map_err(spawn_error)?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                algorithm: invocation.algorithm.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !invocation.output.exists() {
            return Err(EngineError::MissingOutput {
                algorithm: invocation.algorithm.to_string(),
                path: invocation.output.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Parameters;
    use std::path::Path;

    fn buffer_invocation() -> Invocation {
        Invocation::new(
            "native:buffer",
            Parameters::new()
                .path("INPUT", Path::new("in.shp"))
                .number("DISTANCE", 1.0)
                .path("OUTPUT", Path::new("out.shp")),
            PathBuf::from("out.shp"),
        )
    }

    #[test]
    fn test_payload_wraps_inputs() {
        let payload = QgisProcess::payload(&buffer_invocation()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["inputs"]["INPUT"], "in.shp");
        assert_eq!(value["inputs"]["DISTANCE"], 1.0);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut engine = QgisProcess::new("/nonexistent/qgis_process_for_tests");
        let err = engine.run(&buffer_invocation()).unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    fn fake_engine(dir: &Path, body: &str) -> QgisProcess {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("qgis_process");
        std::fs::write(&script, format!("#!/bin/sh\ncat > /dev/null\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        QgisProcess::new(script)
    }

    #[cfg(unix)]
    fn invocation_writing(output: &Path) -> Invocation {
        Invocation::new(
            "native:buffer",
            Parameters::new()
                .path("INPUT", Path::new("in.shp"))
                .path("OUTPUT", output),
            output.to_path_buf(),
        )
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_captures_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = fake_engine(tmp.path(), "echo boom >&2\nexit 3");
        let err = engine
            .run(&invocation_writing(&tmp.path().join("out.shp")))
            .unwrap_err();
        match err {
            EngineError::Failed {
                algorithm,
                code,
                stderr,
            } => {
                assert_eq!(algorithm, "native:buffer");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output_is_missing_output() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out.shp");
        let mut engine = fake_engine(tmp.path(), "exit 0");
        let err = engine.run(&invocation_writing(&output)).unwrap_err();
        match err {
            EngineError::MissingOutput { path, .. } => assert_eq!(path, output),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success_with_output() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out.shp");
        let mut engine = fake_engine(tmp.path(), &format!("touch '{}'", output.display()));
        engine.run(&invocation_writing(&output)).unwrap();
        assert!(output.exists());
    }
}
