//! `taskkit_log` v1:
//! Process-wide logging setup shared by the taskkit tools.
//!
//! Call [`init_logging`] once at process start. Events go to stdout and to a
//! per-day file `<dir_logs>/YYYYMMDD.log`, one line each:
//!
//! ```text
//! 2024-03-09 14:02:11,507 - taskkit_io_xlsx::convert - INFO - workbook saved n_sheets=2
//! ```
//!
//! `RUST_LOG` overrides the default level filter.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Default directory for per-day log files.
pub const C_DIR_LOGS_DEFAULT: &str = "logs";
/// Per-day log file name pattern.
pub const C_FMT_FILE_NAME: &str = "%Y%m%d.log";
/// Line timestamp pattern.
pub const C_FMT_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S,%3f";
/// Default level filter when `RUST_LOG` is unset.
pub const C_LEVEL_DEFAULT: &str = "info";

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLogOptions {
    /// Directory for per-day log files; `None` disables the file sink.
    pub dir_logs: Option<PathBuf>,
    /// Level filter used when `RUST_LOG` is unset.
    pub level_default: String,
    /// Mirror events to stdout.
    pub if_console: bool,
}

impl Default for SpecLogOptions {
    fn default() -> Self {
        Self {
            dir_logs: Some(PathBuf::from(C_DIR_LOGS_DEFAULT)),
            level_default: C_LEVEL_DEFAULT.to_string(),
            if_console: true,
        }
    }
}

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LogInitError {
    /// Log directory or file could not be prepared.
    #[error("Failed to prepare log file {}: {source}", path.display())]
    LogFile {
        /// Log file path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: io::Error,
    },
    /// Level filter did not parse.
    #[error("Invalid log filter {filter:?}: {source}")]
    Filter {
        /// Raw filter text.
        filter: String,
        /// Parse error.
        #[source]
        source: ParseError,
    },
    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Result of a successful [`init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHandle {
    path_file_log: Option<PathBuf>,
}

impl LogHandle {
    /// Active log file, if the file sink is enabled.
    pub fn file_log(&self) -> Option<&Path> {
        self.path_file_log.as_deref()
    }
}

/// `<timestamp> - <target> - <LEVEL> - <message>` line formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterDashed;

impl<S, N> FormatEvent<S, N> for FormatterDashed
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format(C_FMT_TIMESTAMP),
            metadata.target(),
            metadata.level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Per-day log file path under `dir_logs`.
pub fn derive_log_file_path(dir_logs: &Path, date: NaiveDate) -> PathBuf {
    dir_logs.join(date.format(C_FMT_FILE_NAME).to_string())
}

fn open_log_file(dir_logs: &Path, date: NaiveDate) -> Result<(PathBuf, File), LogInitError> {
    let path_file_log = derive_log_file_path(dir_logs, date);
    let to_err = |source| LogInitError::LogFile {
        path: path_file_log.clone(),
        source,
    };

    fs::create_dir_all(dir_logs).map_err(to_err)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path_file_log)
        .map_err(to_err)?;
    Ok((path_file_log, file))
}

fn build_env_filter(level_default: &str) -> Result<EnvFilter, LogInitError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level_default).map_err(|source| LogInitError::Filter {
            filter: level_default.to_string(),
            source,
        })
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(options: &SpecLogOptions) -> Result<LogHandle, LogInitError> {
    let filter = build_env_filter(&options.level_default)?;

    let layer_console = options.if_console.then(|| {
        tracing_fmt::layer()
            .event_format(FormatterDashed)
            .with_writer(io::stdout)
    });

    let (path_file_log, layer_file) = match &options.dir_logs {
        Some(dir_logs) => {
            let (path_file_log, file) = open_log_file(dir_logs, Local::now().date_naive())?;
            let layer = tracing_fmt::layer()
                .event_format(FormatterDashed)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(path_file_log), Some(layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer_console)
        .with(layer_file)
        .try_init()?;

    Ok(LogHandle { path_file_log })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_formatter_dashed_line_layout() {
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_fmt::layer()
                .event_format(FormatterDashed)
                .with_ansi(false)
                .with_writer(buffer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "taskkit::payee", n_status = 200, "response received");
        });

        let c_text = buffer.text();
        let l_parts: Vec<&str> = c_text.trim_end().splitn(4, " - ").collect();
        assert_eq!(l_parts.len(), 4);
        assert_eq!(l_parts[0].len(), "2024-03-09 14:02:11,507".len());
        assert_eq!(l_parts[1], "taskkit::payee");
        assert_eq!(l_parts[2], "INFO");
        assert_eq!(l_parts[3], "response received n_status=200");
        assert!(c_text.ends_with('\n'));
    }

    #[test]
    fn test_derive_log_file_path() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            derive_log_file_path(Path::new("logs"), date),
            PathBuf::from("logs/20240309.log")
        );
    }

    #[test]
    fn test_invalid_default_filter() {
        let err = EnvFilter::try_new("taskkit=loud").map(|_| ()).unwrap_err();
        let err = LogInitError::Filter {
            filter: "taskkit=loud".to_string(),
            source: err,
        };
        assert!(err.to_string().contains("Invalid log filter"));
    }

    #[test]
    fn test_init_logging_once_with_file_sink() {
        let tmp = tempfile::tempdir().unwrap();
        let options = SpecLogOptions {
            dir_logs: Some(tmp.path().join("logs")),
            if_console: false,
            ..SpecLogOptions::default()
        };

        let handle = init_logging(&options).unwrap();
        let path_file_log = handle.file_log().unwrap().to_path_buf();
        assert!(path_file_log.starts_with(tmp.path().join("logs")));

        tracing::error!("file sink check");
        let c_text = fs::read_to_string(&path_file_log).unwrap();
        assert!(c_text.contains(" - ERROR - file sink check"));

        assert!(matches!(
            init_logging(&options),
            Err(LogInitError::AlreadyInitialized(_))
        ));
    }
}
