use crate::error::{ContribError, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the external `git` binary with a bounded wait.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    timeout: Duration,
}

impl Git {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// A path is a repository iff `git rev-parse --is-inside-work-tree` succeeds there.
    pub fn is_repository(&self, path: &Path) -> bool {
        match self.run(path, &["rev-parse", "--is-inside-work-tree"]) {
            Ok(_) => true,
            Err(e) => {
                debug!("{} is not a git work tree: {e}", path.display());
                false
            }
        }
    }

    /// Run `git <args>` in `dir` and return its stdout. Non-zero exit and timeout are errors.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let joined = args.join(" ");
        trace!("running git {joined} in {}", dir.display());

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ContribError::GitSpawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait_bounded(&mut child)? {
            Some(status) => status,
            None => {
                // Reader threads are left detached; they end once the pipes close.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ContribError::GitTimeout {
                    args: joined,
                    timeout: self.timeout,
                });
            }
        };

        let out = collect(stdout)?;
        let err = collect(stderr)?;

        if !status.success() {
            return Err(ContribError::GitFailed {
                args: joined,
                status: status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn wait_bounded(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if started.elapsed() >= self.timeout {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

type Pipe = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Pipe {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            p.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(pipe: Pipe) -> Result<Vec<u8>> {
    match pipe {
        Some(handle) => handle
            .join()
            .map_err(|_| ContribError::Io(std::io::Error::other("pipe reader panicked")))?
            .map_err(ContribError::from),
        None => Ok(Vec::new()),
    }
}
