//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use crate::infrastructure::{InfraError, InfraResult};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Write string content to file (truncates).
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments in the current directory.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;

    /// Run a command with arguments using `dir` as the child's working directory.
    ///
    /// The parent process's working directory is left untouched.
    fn run_in(&self, cmd: &str, args: &[&str], dir: &Path) -> io::Result<Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        })
    }
}

/// Fully-resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer_token: String,
    /// JSON body, if any
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking HTTP transport abstraction.
///
/// Returns `Err` only when no response was received; any status code is `Ok`.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }

    fn run_in(&self, cmd: &str, args: &[&str], dir: &Path) -> io::Result<Output> {
        std::process::Command::new(cmd)
            .args(args)
            .current_dir(dir)
            .output()
    }
}

/// Real transport backed by a blocking `reqwest` client.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> InfraResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfraError::HttpClient)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        use reqwest::header::CONTENT_TYPE;

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
        };
        let mut builder = builder.bearer_auth(&request.bearer_token);
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let resp = builder.send().map_err(io::Error::other)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(io::Error::other)?;
        Ok(HttpResponse { status, body })
    }
}
