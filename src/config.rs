use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "icukpi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the database location.
pub const DATABASE_ENV: &str = "ICUKPI_DB";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "icukpi=info"
}

/// Get the application data directory (~/.icukpi/)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".icukpi")
}

/// Resolve the database path: `ICUKPI_DB` if set, otherwise
/// ~/.icukpi/records.db
pub fn database_path() -> PathBuf {
    match std::env::var_os(DATABASE_ENV) {
        Some(path) => PathBuf::from(path),
        None => app_data_dir().join("records.db"),
    }
}
