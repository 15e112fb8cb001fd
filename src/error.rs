use thiserror::Error;

/// Error types raised by the CLI, the session helper and the [`crate::api::MyJd`] client
#[derive(Error, Debug)]
pub enum JdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("No device available")]
    NoDevice,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("My.JDownloader API error: source={source_name}, type={kind}")]
    Api { source_name: String, kind: String },

    #[error("Network request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
