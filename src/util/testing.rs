//! Test support: logging setup and in-memory I/O doubles
//!
//! The doubles implement the I/O boundary traits so services can be driven
//! without network access or an installed analysis binary.

use std::collections::{HashMap, VecDeque};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::{
    CommandRunner, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================
// HTTP
// ============================================================

#[derive(Debug, Clone)]
enum Scripted {
    Reply(HttpResponse),
    Fail(String),
}

/// HTTP transport answering from a script and recording every request.
///
/// Each `(method, url)` route holds a queue of replies; the last reply
/// repeats once the queue is drained. Unscripted routes answer 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method url`.
    pub fn respond(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> &Self {
        self.push(
            method,
            url.into(),
            Scripted::Reply(HttpResponse {
                status,
                body: body.into(),
            }),
        )
    }

    /// Queue a transport failure (no response) for `method url`.
    pub fn fail(&self, method: HttpMethod, url: impl Into<String>, message: &str) -> &Self {
        self.push(method, url.into(), Scripted::Fail(message.to_string()))
    }

    fn push(&self, method: HttpMethod, url: String, reply: Scripted) -> &Self {
        lock(&self.routes)
            .entry((method, url))
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Requests other than GET.
    pub fn mutations(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != HttpMethod::Get)
            .collect()
    }

    /// Number of requests sent to `url` with `method`.
    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        lock(&self.requests).push(request.clone());

        let mut routes = lock(&self.routes);
        let scripted = match routes.get_mut(&(request.method, request.url.clone())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match scripted {
            Some(Scripted::Reply(resp)) => Ok(resp),
            Some(Scripted::Fail(message)) => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message,
            )),
            None => Ok(HttpResponse {
                status: 404,
                body: format!("no scripted reply for {} {}", request.method, request.url),
            }),
        }
    }
}

// ============================================================
// Commands
// ============================================================

/// One recorded command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall {
    pub cmd: String,
    pub args: Vec<String>,
    /// Working directory given to `run_in`, `None` for `run`
    pub dir: Option<PathBuf>,
}

/// Command runner that records calls and answers with a fixed exit code.
#[derive(Debug, Default)]
pub struct RecordingCommandRunner {
    calls: Mutex<Vec<CommandCall>>,
    outputs: Mutex<HashMap<String, (i32, String, String)>>,
    missing: bool,
}

impl RecordingCommandRunner {
    /// Every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command fails to spawn, as if the binary were not installed.
    pub fn missing_binary() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Answer commands whose first argument is `subcommand` with this output.
    pub fn with_output(self, subcommand: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        lock(&self.outputs).insert(
            subcommand.to_string(),
            (code, stdout.to_string(), stderr.to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<CommandCall> {
        lock(&self.calls).clone()
    }

    fn answer(&self, cmd: &str, args: &[&str], dir: Option<&Path>) -> io::Result<Output> {
        lock(&self.calls).push(CommandCall {
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            dir: dir.map(Path::to_path_buf),
        });

        if self.missing {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{cmd}: not found"),
            ));
        }

        let key = args.first().copied().unwrap_or_default();
        let (code, stdout, stderr) = lock(&self.outputs)
            .get(key)
            .cloned()
            .unwrap_or((0, String::new(), String::new()));
        Ok(Output {
            status: exit_status(code),
            stdout: stdout.into_bytes(),
            stderr: stderr.into_bytes(),
        })
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.answer(cmd, args, None)
    }

    fn run_in(&self, cmd: &str, args: &[&str], dir: &Path) -> io::Result<Output> {
        self.answer(cmd, args, Some(dir))
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
