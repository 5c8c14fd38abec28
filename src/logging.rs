//! Tracing setup for the replay binary: a daily log file plus an in-memory
//! tail of the most recent lines that `--log` prints after the run.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_DIR_ENV: &str = "BLOCKDESK_LOG_DIR";
const LOG_FILE: &str = "blockdesk.log";
const DEFAULT_FILTER: &str = "blockdesk=info";
const DEFAULT_TAIL: usize = 200;

pub struct LogOptions {
    pub dir: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset.
    pub filter: Option<String>,
    pub tail_lines: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            dir: None,
            filter: None,
            tail_lines: DEFAULT_TAIL,
        }
    }
}

/// Last `capacity` formatted lines, oldest first.
#[derive(Clone)]
pub struct LogTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogTail {
    fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push(&self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }

    pub fn snapshot(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
    tail: LogTail,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn tail(&self) -> &LogTail {
        &self.tail
    }
}

/// One event's worth of output; lines reach the tail when it is dropped.
struct TailWriter {
    buf: Vec<u8>,
    tail: LogTail,
}

impl Write for TailWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TailWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        for line in String::from_utf8_lossy(&self.buf).lines() {
            self.tail.push(line);
        }
    }
}

#[derive(Clone)]
struct SessionLogWriter {
    file: NonBlocking,
    tail: LogTail,
}

struct SessionLogSink {
    file: NonBlocking,
    tail: TailWriter,
}

impl<'a> MakeWriter<'a> for SessionLogWriter {
    type Writer = SessionLogSink;

    fn make_writer(&'a self) -> Self::Writer {
        SessionLogSink {
            file: self.file.make_writer(),
            tail: TailWriter {
                buf: Vec::with_capacity(256),
                tail: self.tail.clone(),
            },
        }
    }
}

impl Write for SessionLogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.tail.write_all(&buf[..n])?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Explicit dir, else `$BLOCKDESK_LOG_DIR`, else `<tmp>/blockdesk/logs`.
fn ensure_log_dir(explicit: Option<&Path>) -> io::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => std::env::var_os(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("blockdesk").join("logs")),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Installs the global subscriber. `None` when the log directory cannot be
/// created or a subscriber is already set.
pub fn init(options: LogOptions) -> Option<LoggingGuard> {
    let log_dir = ensure_log_dir(options.dir.as_deref()).ok()?;

    let (file, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE));
    let tail = LogTail::new(options.tail_lines);
    let writer = SessionLogWriter {
        file,
        tail: tail.clone(),
    };

    let fallback = options.filter.as_deref().unwrap_or(DEFAULT_FILTER);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .ok()?;

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::debug!(log_dir = %log_dir.display(), filter = fallback, "logging ready");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
        tail,
    })
}
