pub mod app_config;
pub mod cli;
pub mod error;
pub mod logging;
pub mod reader;
pub mod session;

pub use cli::{Cli, DisplayDuration, MessageSource, ToastOptions};
pub use error::{ConfigError, ToastError};
