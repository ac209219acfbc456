#[cfg(target_arch = "wasm32")]
fn main() {
    use chemcalc_web::{AppConfig, logging, platform};

    if let Err(logger_error) = logging::init_from_page() {
        zoon_fallback(&logger_error.to_string());
    }
    match AppConfig::default_config() {
        Ok(config) => platform::browser::start(config),
        Err(config_error) => log::error!("[App] {config_error}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn zoon_fallback(message: &str) {
    chemcalc_web::zoon::eprintln!("logger not installed: {message}");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("chemcalc-frontend runs in the browser; build it for wasm32-unknown-unknown");
}
