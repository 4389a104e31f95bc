//! The toast session: acquire text, render, wait, repeat, tear down
use std::borrow::Cow;
use std::future::Future;

use poptart_overlay::{NativeSurface, Renderer, ToastOverlay, ToastWindow};
use tokio::time::sleep;

use crate::cli::{DisplayDuration, MessageSource, ToastOptions};
use crate::error::ToastError;
use crate::reader::run_command;

/// Open the configured surface and wrap it in a transparent full-screen canvas
pub fn open_overlay(options: &ToastOptions) -> Result<ToastOverlay, ToastError> {
    let surface = NativeSurface::open(options.surface.clone())?;
    let renderer = Renderer::new(
        options.appearance.font_family.as_deref(),
        options.appearance.font_dir.as_deref(),
    );
    let window = ToastWindow::new(surface, renderer);
    tracing::debug!(
        width = window.width(),
        height = window.height(),
        "display size"
    );
    Ok(ToastOverlay::new(window, options.appearance.clone()))
}

/// Run until the toast expires (or forever with `repeat`), stopping early
/// on Ctrl-C or SIGTERM. The display is restored in every case.
pub async fn run(options: &ToastOptions, overlay: &mut ToastOverlay) -> Result<(), ToastError> {
    let interrupted = async {
        tokio::select! {
            _ = ctrl_c() => tracing::info!("interrupted"),
            _ = terminate() => tracing::info!("terminated"),
        }
    };
    run_until(options, overlay, interrupted).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// [`run`] with an explicit shutdown signal
pub async fn run_until<S>(
    options: &ToastOptions,
    overlay: &mut ToastOverlay,
    shutdown: S,
) -> Result<(), ToastError>
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let result = loop {
        let text: Cow<'_, str> = match &options.source {
            MessageSource::Literal(text) | MessageSource::Stdin(text) => Cow::Borrowed(text.as_str()),
            MessageSource::Command(command) => {
                tokio::select! {
                    _ = &mut shutdown => break Ok(()),
                    output = run_command(command) => match output {
                        Ok(text) => Cow::Owned(text),
                        Err(e) => break Err(e),
                    },
                }
            }
        };

        if let Err(e) = render_once(options, overlay, &text) {
            break Err(e);
        }
        drop(text);

        let stopped = match options.duration {
            DisplayDuration::Skip => false,
            DisplayDuration::For(duration) => {
                tokio::select! {
                    _ = &mut shutdown => true,
                    _ = sleep(duration) => false,
                }
            }
            DisplayDuration::Forever => {
                (&mut shutdown).await;
                true
            }
        };

        if stopped || !options.repeat {
            break Ok(());
        }
    };

    match (result, overlay.restore()) {
        (Ok(()), restored) => restored.map_err(ToastError::from),
        (Err(e), Err(restore_err)) => {
            tracing::warn!(error = %restore_err, "failed to restore display");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

fn render_once(
    options: &ToastOptions,
    overlay: &mut ToastOverlay,
    text: &str,
) -> Result<(), ToastError> {
    overlay.render(text, options.font_size)?;

    if let Some(path) = &options.snapshot {
        overlay
            .save_snapshot(path)
            .map_err(|source| ToastError::Snapshot {
                path: path.clone(),
                source,
            })?;
    }
    Ok(())
}
