//! Command-line interface
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use poptart_overlay::SurfaceConfig;
use poptart_types::{AppearanceConfig, ToastConfig};

use crate::error::ToastError;

const LONG_ABOUT: &str = "\
poptart can be used in several different modes. The standard mode is with a
MESSAGE string passed as an argument; MESSAGE is displayed. The string to
display can also be piped; use the -i flag to instruct poptart to read from
STDIN for its message. The last mode is command mode; use the -c flag
followed by a command string; poptart will run this command in the shell
and use the command's STDOUT output as the display string.

Command mode is most useful when combined with the -l flag, which causes
poptart to loop and repeatedly call the command string.";

#[derive(Parser, Debug)]
#[command(name = "poptart", version)]
#[command(about = "Toast notifications on the framebuffer", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Message to display
    pub message: Option<String>,

    /// Read the message from STDIN
    #[arg(short = 'i', long = "stdin")]
    pub stdin: bool,

    /// Run COMMAND in the shell and display its output
    #[arg(short, long, value_name = "COMMAND")]
    pub command: Option<String>,

    /// Keep showing the toast; re-runs COMMAND every time
    #[arg(short = 'l', long = "loop")]
    pub repeat: bool,

    /// Text font size
    #[arg(short, long, value_name = "SIZE")]
    pub size: Option<u32>,

    /// Seconds to display the toast; 0 exits at once, negative shows forever
    #[arg(short, long, value_name = "SEC", allow_negative_numbers = true, value_parser = parse_seconds)]
    pub time: Option<f64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Display
    // ─────────────────────────────────────────────────────────────────────────
    /// Framebuffer device (defaults to the configured one, usually /dev/fb0)
    #[arg(long, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Render off-screen instead of on a display
    #[arg(long)]
    pub headless: bool,

    /// Write each rendered toast to a PNG file
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Load configuration from PATH instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if secs.is_nan() {
        return Err("not a number".to_string());
    }
    Ok(secs)
}

/// How long each toast stays up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDuration {
    /// Zero: nothing is shown at all
    Skip,
    For(Duration),
    Forever,
}

impl DisplayDuration {
    pub fn from_secs(secs: f64) -> Self {
        if secs == 0.0 {
            Self::Skip
        } else if secs < 0.0 {
            Self::Forever
        } else {
            Duration::try_from_secs_f64(secs).map_or(Self::Forever, Self::For)
        }
    }
}

/// Where each toast's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Literal(String),
    /// Read once, before the first render
    Stdin(String),
    /// Re-run before every render
    Command(String),
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ToastOptions {
    pub duration: DisplayDuration,
    pub font_size: u32,
    pub repeat: bool,
    pub source: MessageSource,
    pub snapshot: Option<PathBuf>,
    pub surface: SurfaceConfig,
    pub appearance: AppearanceConfig,
}

impl Cli {
    /// Merge the arguments with persisted config.
    ///
    /// Returns `Ok(None)` when the duration is zero and there is nothing to
    /// do. `read_stdin` is only called for `-i` without `-c`.
    pub fn into_options<F>(
        self,
        config: ToastConfig,
        read_stdin: F,
    ) -> Result<Option<ToastOptions>, ToastError>
    where
        F: FnOnce() -> Result<String, ToastError>,
    {
        let duration = DisplayDuration::from_secs(self.time.unwrap_or(config.duration_secs));
        if duration == DisplayDuration::Skip {
            return Ok(None);
        }

        let source = if let Some(command) = self.command {
            MessageSource::Command(command)
        } else if self.stdin {
            MessageSource::Stdin(read_stdin()?)
        } else if let Some(message) = self.message {
            MessageSource::Literal(message)
        } else {
            return Err(ToastError::NoMessage);
        };

        let surface = if self.headless {
            SurfaceConfig::Headless {
                width: config.display.headless_width,
                height: config.display.headless_height,
            }
        } else {
            SurfaceConfig::Framebuffer {
                device: self.device.unwrap_or(config.display.device),
            }
        };

        Ok(Some(ToastOptions {
            duration,
            font_size: self.size.unwrap_or(config.appearance.font_size),
            repeat: self.repeat,
            source,
            snapshot: self.snapshot,
            surface,
            appearance: config.appearance,
        }))
    }
}
