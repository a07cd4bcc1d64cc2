use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or configuring an engine.
///
/// Ticking and command dispatch are total; only construction-time work
/// (config validation, pool setup, config loading) can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The fixed worker pool could not be created.
    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Malformed JSON configuration.
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    /// Propagated I/O errors (config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("workers must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("workers"));
    }

    #[test]
    fn config_error_converts() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let e: Error = parse.into();
        assert!(e.to_string().starts_with("config:"));
    }
}
