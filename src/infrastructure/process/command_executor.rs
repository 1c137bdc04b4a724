use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use crate::common::error::WcError;
use crate::common::result::{OptionExt, WcResult};
use crate::domain::value_objects::output_filter::{OutputFilter, OutputStream};
use crate::infrastructure::console::{ConsoleSink, OutputSink};

/// How long output is still collected once the child has exited
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// The command a [`ProcessRun`] executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Program followed by its arguments, no shell involved
    Argv(Vec<String>),
    /// A string handed to the platform shell
    Shell(String),
}

impl CommandLine {
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Argv(args.into_iter().map(Into::into).collect())
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self::Shell(command.into())
    }

    fn program_and_args(&self) -> WcResult<(String, Vec<String>)> {
        match self {
            CommandLine::Argv(args) => {
                let (program, rest) = args
                    .split_first()
                    .ok_or_internal_error("Command has no program")?;
                Ok((program.clone(), rest.to_vec()))
            }
            CommandLine::Shell(command) => {
                if command.trim().is_empty() {
                    return Err(WcError::internal_error("Shell command is empty"));
                }
                let (shell, flag) = if cfg!(target_os = "windows") {
                    ("cmd", "/C")
                } else {
                    ("sh", "-c")
                };
                Ok((shell.to_string(), vec![flag.to_string(), command.clone()]))
            }
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Argv(args) => write!(f, "{}", args.join(" ")),
            CommandLine::Shell(command) => write!(f, "{}", command),
        }
    }
}

/// Result of a finished [`ProcessRun`]
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub command: String,

    /// Exit code, `-1` when the process was terminated by a signal
    pub exit_code: i32,

    /// Kept stdout lines, when capture was enabled
    pub stdout: Vec<String>,

    /// Kept stderr lines, when capture was enabled
    pub stderr: Vec<String>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    /// First stdout line with surrounding whitespace removed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.first().map(|line| line.trim())
    }
}

/// One execution of an external command with filtered, optionally echoed output.
///
/// Both pipes are drained concurrently while the child runs. The run is over
/// when the child exits; lines still buffered in the pipes at that point are
/// collected for a short grace period. Each kept line is optionally buffered
/// and optionally echoed to the sink; the header, when set, is echoed once
/// right before the first echoed line of either stream.
pub struct ProcessRun {
    command: CommandLine,
    working_directory: PathBuf,
    filter: Option<OutputFilter>,
    capture_stdout: bool,
    capture_stderr: bool,
    echo_stdout: bool,
    echo_stderr: bool,
    check_exit_code: bool,
    header: Option<String>,
    sink: Arc<dyn OutputSink>,
}

impl ProcessRun {
    pub fn new(command: CommandLine, working_directory: impl AsRef<Path>) -> Self {
        Self {
            command,
            working_directory: working_directory.as_ref().to_path_buf(),
            filter: None,
            capture_stdout: true,
            capture_stderr: true,
            echo_stdout: false,
            echo_stderr: false,
            check_exit_code: true,
            header: None,
            sink: Arc::new(ConsoleSink),
        }
    }

    pub fn with_filter(mut self, filter: OutputFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_capture(mut self, stdout: bool, stderr: bool) -> Self {
        self.capture_stdout = stdout;
        self.capture_stderr = stderr;
        self
    }

    pub fn with_echo(mut self, stdout: bool, stderr: bool) -> Self {
        self.echo_stdout = stdout;
        self.echo_stderr = stderr;
        self
    }

    pub fn with_check_exit_code(mut self, check: bool) -> Self {
        self.check_exit_code = check;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    pub async fn run(self) -> WcResult<ProcessOutput> {
        let start_time = Instant::now();
        let (program, args) = self.command.program_and_args()?;
        let command_text = self.command.to_string();

        tracing::debug!(
            command = %command_text,
            cwd = %self.working_directory.display(),
            "running external command"
        );

        let mut cmd = TokioCommand::new(&program);
        cmd.args(&args)
            .current_dir(&self.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| WcError::spawn_failed(&command_text, &self.working_directory, e))?;

        let stdout = child.stdout.take().ok_or_internal_error("stdout was not piped")?;
        let stderr = child.stderr.take().ok_or_internal_error("stderr was not piped")?;
        let mut stdout_segments = BufReader::new(stdout).split(b'\n');
        let mut stderr_segments = BufReader::new(stderr).split(b'\n');

        let mut router = LineRouter::new(&self);
        let mut stdout_open = true;
        let mut stderr_open = true;

        // A background job started by the command may hold the pipes open
        // long after the child itself is gone
        let status = loop {
            let read = tokio::select! {
                segment = stdout_segments.next_segment(), if stdout_open => {
                    router.route(OutputStream::Stdout, segment, &mut stdout_open)
                }
                segment = stderr_segments.next_segment(), if stderr_open => {
                    router.route(OutputStream::Stderr, segment, &mut stderr_open)
                }
                exited = child.wait() => break exited?,
            };
            if let Err(err) = read {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(err.into());
            }
        };

        // Lines already written before the exit are still in the pipes
        let drain_deadline = tokio::time::sleep(DRAIN_GRACE);
        tokio::pin!(drain_deadline);
        while stdout_open || stderr_open {
            tokio::select! {
                segment = stdout_segments.next_segment(), if stdout_open => {
                    router.route(OutputStream::Stdout, segment, &mut stdout_open)?;
                }
                segment = stderr_segments.next_segment(), if stderr_open => {
                    router.route(OutputStream::Stderr, segment, &mut stderr_open)?;
                }
                _ = &mut drain_deadline => {
                    tracing::debug!(command = %command_text, "output pipes still open after exit, not waiting for them");
                    break;
                }
            }
        }

        let exit_code = status.code().unwrap_or(-1);
        let (stdout_lines, stderr_lines) = router.into_buffers();

        tracing::debug!(
            command = %command_text,
            exit_code,
            elapsed = ?start_time.elapsed(),
            "external command finished"
        );

        if self.check_exit_code && exit_code != 0 {
            return Err(WcError::command_failed(
                command_text,
                &self.working_directory,
                exit_code,
                stderr_lines.join("\n"),
            ));
        }

        Ok(ProcessOutput {
            command: command_text,
            exit_code,
            stdout: stdout_lines,
            stderr: stderr_lines,
        })
    }
}

/// Applies filter, buffering, echo and header policy line by line
struct LineRouter<'a> {
    run: &'a ProcessRun,
    header_pending: bool,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl<'a> LineRouter<'a> {
    fn new(run: &'a ProcessRun) -> Self {
        Self {
            run,
            header_pending: run.header.is_some(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    fn accept(&mut self, stream: OutputStream, bytes: &[u8]) {
        let decoded = String::from_utf8_lossy(bytes);
        let line = decoded.strip_suffix('\r').unwrap_or(&decoded);

        if let Some(filter) = &self.run.filter {
            if !filter.keep(stream, line) {
                return;
            }
        }

        let (capture, echo) = match stream {
            OutputStream::Stdout => (self.run.capture_stdout, self.run.echo_stdout),
            OutputStream::Stderr => (self.run.capture_stderr, self.run.echo_stderr),
        };

        if echo {
            if self.header_pending {
                self.header_pending = false;
                if let Some(header) = &self.run.header {
                    self.run.sink.primary(header);
                }
            }
            self.run.sink.write_line(stream, line);
        }

        if capture {
            match stream {
                OutputStream::Stdout => self.stdout.push(line.to_string()),
                OutputStream::Stderr => self.stderr.push(line.to_string()),
            }
        }
    }

    /// Feed one read result; EOF closes the stream
    fn route(
        &mut self,
        stream: OutputStream,
        segment: std::io::Result<Option<Vec<u8>>>,
        open: &mut bool,
    ) -> std::io::Result<()> {
        match segment? {
            Some(bytes) => self.accept(stream, &bytes),
            None => *open = false,
        }
        Ok(())
    }

    fn into_buffers(self) -> (Vec<String>, Vec<String>) {
        (self.stdout, self.stderr)
    }
}
