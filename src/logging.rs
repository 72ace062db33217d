//! Log sink for the binary.
//!
//! Library code only uses the `log` macros. The binary installs an
//! `env_logger` that timestamps each line and tees it to stderr and the run's
//! log file.

use chrono::Local;
use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes everything to `primary`, and to `secondary` when present.
///
/// Failures on the secondary sink are swallowed so a full disk never stops
/// console logging.
pub struct TeeWriter<A, B> {
    primary: A,
    secondary: Option<B>,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(primary: A, secondary: Option<B>) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        if let Some(secondary) = self.secondary.as_mut() {
            let _ = secondary.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(secondary) = self.secondary.as_mut() {
            let _ = secondary.flush();
        }
        self.primary.flush()
    }
}

/// `[12:34:56.789] INFO  message`
pub fn format_line(level: log::Level, message: &std::fmt::Arguments) -> String {
    format!(
        "[{}] {:<5} {}",
        Local::now().format("%H:%M:%S%.3f"),
        level,
        message
    )
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialises the global logger. `RUST_LOG` overrides the level.
///
/// Returns an error if a logger was already installed.
pub fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let file = log_file.and_then(open_log_file);

    Builder::new()
        .filter_level(level)
        .parse_env(Env::default())
        .format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())))
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))))
        .try_init()
}

/// Logs panics (message and location) before the default handler runs.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log::error!("[PANIC]{} {}", location, msg);
        default_hook(panic_info);
    }));
}
