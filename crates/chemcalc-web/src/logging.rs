//! `log` backend for the browser console.
//!
//! The level can be raised per page load with a `log` query parameter, e.g.
//! `index.html?log=debug`.

use log::LevelFilter;

pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Reads the `log` parameter of a URL query string (with or without the
/// leading `?`). Missing or unparsable values give [`DEFAULT_LEVEL`].
pub fn level_from_query(query: &str) -> LevelFilter {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "log")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

#[cfg(target_arch = "wasm32")]
pub use browser::{ZoonLogger, init, init_from_page};

#[cfg(target_arch = "wasm32")]
mod browser {
    use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

    /// Forwards records to the browser console; warnings and errors go to
    /// `console.error`.
    pub struct ZoonLogger;

    static LOGGER: ZoonLogger = ZoonLogger;

    impl Log for ZoonLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            match record.level() {
                Level::Error | Level::Warn => {
                    zoon::eprintln!("{} {}: {}", record.level(), record.target(), record.args())
                }
                _ => zoon::println!("{} {}: {}", record.level(), record.target(), record.args()),
            }
        }

        fn flush(&self) {}
    }

    /// Installs [`ZoonLogger`]. Fails if another logger is already set.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }

    /// Installs [`ZoonLogger`] at the level named by the page URL.
    pub fn init_from_page() -> Result<(), SetLoggerError> {
        let query = web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default();
        init(super::level_from_query(&query))
    }
}
