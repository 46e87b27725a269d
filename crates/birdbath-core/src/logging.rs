//! Logging: timestamped diagnostic file plus a filtered console stream.
//!
//! The file sink takes everything at debug and above, one timestamped
//! line per record, so every per-attempt fetch error is preserved. The
//! console shows what the env_logger filter allows (info by default) and
//! suppresses transport-library targets entirely, keeping wire-level
//! noise out of the user-facing stream.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use indicatif::MultiProgress;

/// Targets whose records never reach the console. They still land in the
/// diagnostic file.
const CONSOLE_SUPPRESSED_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// Padded label for a log level.
fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn console_allows(target: &str) -> bool {
    !CONSOLE_SUPPRESSED_TARGETS
        .iter()
        .any(|t| target == *t || (target.starts_with(t) && target[t.len()..].starts_with("::")))
}

/// Logger with two sinks: an append-only diagnostic file and a filtered
/// console stream routed through indicatif when progress bars are up.
pub struct DualLogger {
    console: env_logger::Logger,
    multi: Option<MultiProgress>,
    file: Option<Mutex<File>>,
}

impl DualLogger {
    pub fn new(
        console: env_logger::Logger,
        multi: Option<MultiProgress>,
        file: Option<File>,
    ) -> Self {
        Self {
            console,
            multi,
            file: file.map(Mutex::new),
        }
    }
}

impl log::Log for DualLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if record.level() <= log::Level::Debug {
            if let Some(file) = &self.file {
                let line = format!(
                    "{} [{}] {}\n",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    level_label(record.level()),
                    record.args()
                );
                if let Ok(mut f) = file.lock() {
                    let _ = f.write_all(line.as_bytes());
                }
            }
        }

        if self.console.enabled(record.metadata()) && console_allows(record.target()) {
            let line = format!("[{}] {}", level_label(record.level()), record.args());
            match &self.multi {
                Some(multi) => multi.suspend(|| eprintln!("{line}")),
                None => eprintln!("{line}"),
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Initialize process-wide logging.
///
/// Console level: warn when `quiet`, debug when `debug`, info otherwise
/// (RUST_LOG still wins). The diagnostic file always captures debug+.
pub fn init_logging(quiet: bool, debug: bool, log_file: Option<&Path>, multi: Option<&MultiProgress>) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let console = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .build();

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("cannot open log file {}: {e}", path.display());
                None
            }
        }
    });

    log::set_boxed_logger(Box::new(DualLogger::new(console, multi.cloned(), file)))
        .expect("failed to init logger");
    log::set_max_level(log::LevelFilter::Debug);
}
