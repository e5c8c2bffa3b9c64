use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "settings file not found; checked the current directory \
        (cloudsweep.toml, .cloudsweep.toml), ~/.config/cloudsweep/, and the \
        CLOUDSWEEP_CONFIG_PATH environment variable"
    )]
    SettingsFileNotFound,

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
