//! Error types for toast operations

use std::error::Error as StdError;
use std::path::PathBuf;

use poptart_overlay::PlatformError;
use thiserror::Error;

/// Errors while acquiring input, rendering, or presenting a toast
#[derive(Debug, Error)]
pub enum ToastError {
    #[error("no message given; pass MESSAGE, -i, or -c COMMAND")]
    NoMessage,

    #[error("failed to read message from stdin")]
    ReadStdin(#[source] std::io::Error),

    #[error("failed to run command `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read output of `{command}`")]
    CommandOutput {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("display error")]
    Platform(#[from] PlatformError),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to write snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: PlatformError,
    },
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),
}

/// Render an error and its sources as "outer: inner: root"
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
