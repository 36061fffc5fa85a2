use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::LevelFilter;
use log::Level;
use env_logger::{Builder, Env, fmt::Color};
use std::io::Write;
use once_cell::sync::OnceCell;
use thiserror::Error;

static INSTANCE: OnceCell<Logger> = OnceCell::new();

/// Environment variable allowing users to override the log filter (e.g. `DPSIM_LOG=depth_sims=trace`)
pub const LOG_ENV_VAR: &str = "DPSIM_LOG";

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}/{eta_precise}] {bar:40} {pos}/{len} {msg}";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Logger was already initialized")]
    AlreadyInitialized,

    #[error("Failed to wrap logger with multiprogress")]
    WrapLogger(#[from] log::SetLoggerError),
}

#[derive(Debug)]
pub struct Logger {
    multi_pg: MultiProgress,
}

impl Logger {

    /// Initialize the global logger, at the requested verbosity level.
    /// # Errors
    /// - if a global logger was already set for this process. 
    pub fn init(verbosity: u8) -> Result<(), LoggerError> {
        if INSTANCE.get().is_some() {
            return Err(LoggerError::AlreadyInitialized)
        }

        let log_level = Self::u8_to_loglevel(verbosity);
        let env = Env::default()
            .filter(LOG_ENV_VAR);

        let logger = Builder::new().filter_level(log_level)
            .format(|buf, record| {
                let (traceback, set_intensity) = match record.level() {
                    Level::Error => (format!("(@ {}:{}) ", record.file().unwrap_or("unknown"), record.line().unwrap_or(0)), true),
                    _            => (String::new(), false)
                };

                let mut arg_style = buf.style();
                arg_style.set_intense(set_intensity);

                let mut level_style = buf.style();
                let color = match record.level() {
                    Level::Error => Color::Red,
                    Level::Warn  => Color::Yellow, 
                    Level::Info  => Color::Green,
                    Level::Debug => Color::Blue,
                    Level::Trace => Color::Cyan
                };
                level_style.set_color(color).set_bold(true);

                writeln!(
                    buf,
                    "[{} {: <5} {}] {traceback}{}",
                    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                    level_style.value(record.level()),
                    record.target(),
                    arg_style.value(record.args())
                )
            })
            .parse_env(env)
            .build();

        // ---- Progress bar support: log lines are printed above any active bar.
        let multi_pg = MultiProgress::new();
        LogWrapper::new(multi_pg.clone(), logger).try_init()?;
        log::set_max_level(log_level);
        INSTANCE.set(Self{multi_pg}).map_err(|_| LoggerError::AlreadyInitialized)
    }

    fn u8_to_loglevel(verbosity: u8) -> LevelFilter {
        match verbosity {
            0            => LevelFilter::Error,
            1            => LevelFilter::Warn,
            2            => LevelFilter::Info,
            3            => LevelFilter::Debug,
            4..= u8::MAX => LevelFilter::Trace
        }
    }

    pub fn set_level(verbosity: u8) {
        log::set_max_level(Self::u8_to_loglevel(verbosity));
    }

    /// Access the global `MultiProgress`. Returns `None` if the logger was never initialized
    pub fn multi() -> Option<&'static MultiProgress> {
        INSTANCE.get().map(|logger| &logger.multi_pg)
    }

    /// Build a progress bar of length `len`, attached to the global `MultiProgress`.
    /// 
    /// The bar is hidden whenever the logger is uninitialized (library use, tests), or when the
    /// max log level is `Error` (i.e. in `--quiet` mode).
    pub fn progress_bar(len: u64, message: &'static str) -> ProgressBar {
        let visible = Self::progress_visible(log::max_level());
        let Some(multi) = Self::multi().filter(|_| visible) else {
            return ProgressBar::hidden()
        };

        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        multi.add(ProgressBar::new(len).with_style(style).with_message(message))
    }

    /// Progress bars are drawn at every level but `Error`.
    fn progress_visible(level: LevelFilter) -> bool {
        level > LevelFilter::Error
    }
}
