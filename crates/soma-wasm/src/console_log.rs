//! `log` backend writing to the browser console, plus the panic hook.

use log::LevelFilter;
#[cfg(target_arch = "wasm32")]
use log::{Level, Log, Metadata, Record};

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

/// Install the console logger and panic hook once per page. Native builds
/// only apply the level filter to whatever logger the host installed.
pub fn init(level: LevelFilter) {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_UP: Once = Once::new();
        SET_UP.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(level);
            }
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Soma WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }

    #[test]
    fn native_init_applies_level_filter() {
        init(parse_level("warn"));
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
