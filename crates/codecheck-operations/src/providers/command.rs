use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use codecheck_core::{InspectionError, Issue, Rule};
use serde::Serialize;
use tracing::debug;
use wait_timeout::ChildExt;

use crate::traits::{InspectionRequest, Inspector};
use crate::{OperationError, Result};

pub const DEFAULT_INSPECTOR_TIMEOUT: Duration = Duration::from_secs(120);

/// Inspector backed by an external program.
///
/// The program is started once per inspection with the file's on-disk path
/// appended to its arguments. A JSON request (path, content, rules) is
/// written to its stdin and a JSON array of issues is expected on stdout.
/// A non-zero exit, a timeout, or unparseable output fails the file.
#[derive(Debug, Clone)]
pub struct CommandInspector {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
}

#[derive(Serialize)]
struct RequestPayload<'a> {
    path: &'a Path,
    disk_path: &'a Path,
    content: &'a str,
    rules: Vec<&'a Rule>,
}

impl CommandInspector {
    /// # Errors
    ///
    /// Returns [`OperationError::EmptyInspectorCommand`] if `command` has no
    /// program.
    pub fn new<S: Into<OsString> + Clone>(command: &[S]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or(OperationError::EmptyInspectorCommand)?;

        Ok(Self {
            program: program.clone().into(),
            args: args.iter().cloned().map(Into::into).collect(),
            timeout: DEFAULT_INSPECTOR_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, disk_path: &Path, payload: Vec<u8>) -> std::result::Result<Vec<u8>, InspectionError> {
        let program = self.program.to_string_lossy();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(disk_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| InspectionError::new(format!("failed to spawn '{program}': {err}")))?;

        // The timeout covers the whole exchange: a program that never reads
        // its input must not block the caller on a full pipe.
        let stdin_handle = child.stdin.take().map(|stdin| spawn_writer(stdin, payload));
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        // On the error paths the I/O threads are left to finish on their own;
        // descendants of the program may still hold the pipes open.
        match child.wait_timeout(self.timeout) {
            Ok(Some(_)) => (),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InspectionError::new(format!(
                    "'{program}' timed out after {}s",
                    self.timeout.as_secs_f64()
                )));
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InspectionError::new(format!(
                    "failed waiting on '{program}': {err}"
                )));
            }
        }

        let status = child
            .wait()
            .map_err(|err| InspectionError::new(format!("failed to reap '{program}': {err}")))?;

        if let Some(handle) = stdin_handle {
            match handle.join() {
                Ok(Ok(())) => {}
                // The program may exit without reading its input.
                Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(path = %disk_path.display(), "inspector closed stdin early");
                }
                Ok(Err(err)) => {
                    return Err(InspectionError::new(format!(
                        "failed to write to '{program}' stdin: {err}"
                    )));
                }
                Err(_) => return Err(InspectionError::new("failed to join stdin writer")),
            }
        }

        let stdout = join_reader(stdout_handle, "stdout")?;
        let stderr = join_reader(stderr_handle, "stderr")?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "terminated".to_string(), |c| c.to_string());
            return Err(InspectionError::new(format!(
                "'{program}' failed with status {code}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        Ok(stdout)
    }
}

impl Inspector for CommandInspector {
    fn inspect(
        &self,
        request: &InspectionRequest<'_>,
    ) -> std::result::Result<Vec<Issue>, InspectionError> {
        let payload = RequestPayload {
            path: request.original_path,
            disk_path: request.disk_path,
            content: request.content,
            rules: request.catalog.iter().collect(),
        };
        let payload = serde_json::to_vec(&payload)
            .map_err(|err| InspectionError::new(format!("failed to encode request: {err}")))?;

        let stdout = self.run(request.disk_path, payload)?;

        serde_json::from_slice(&stdout)
            .map_err(|err| InspectionError::new(format!("malformed inspector output: {err}")))
    }
}

fn spawn_writer<W: Write + Send + 'static>(
    mut stream: W,
    payload: Vec<u8>,
) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        stream.write_all(&payload)?;
        stream.flush()
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> std::result::Result<Vec<u8>, InspectionError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| InspectionError::new(format!("failed to join {stream} reader")))?
            .map_err(|err| InspectionError::new(format!("failed to read {stream}: {err}"))),
        None => Ok(Vec::new()),
    }
}
