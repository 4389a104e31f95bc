//! Message input: piped stdin and command output
use std::io::{self, IsTerminal, Read};
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::ToastError;

const READ_CHUNK: usize = 4096;

/// Read everything available from `reader` as text.
///
/// Stops at EOF, or early on `WouldBlock` for readers in non-blocking mode.
/// Invalid UTF-8 is replaced and trailing whitespace is trimmed.
pub fn slurp<R: Read>(mut reader: R) -> io::Result<String> {
    let mut bytes = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => return Err(e),
        }
    }
    Ok(into_text(bytes))
}

fn into_text(bytes: Vec<u8>) -> String {
    let mut text = String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    text.truncate(text.trim_end().len());
    text
}

/// Read the message piped on stdin.
///
/// An interactive terminal has nothing piped, so it yields an empty message
/// instead of waiting for the user.
pub fn read_stdin() -> Result<String, ToastError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        tracing::warn!("stdin is a terminal; nothing to read");
        return Ok(String::new());
    }
    slurp(stdin.lock()).map_err(ToastError::ReadStdin)
}

/// Run `command` through `sh -c` and return its stdout.
///
/// A non-zero exit status is logged but the output is still used.
pub async fn run_command(command: &str) -> Result<String, ToastError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToastError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let mut bytes = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout
            .read_to_end(&mut bytes)
            .await
            .map_err(|source| ToastError::CommandOutput {
                command: command.to_string(),
                source,
            })?;
    }

    let status = child
        .wait()
        .await
        .map_err(|source| ToastError::CommandOutput {
            command: command.to_string(),
            source,
        })?;
    if !status.success() {
        tracing::warn!(command, %status, "command exited unsuccessfully");
    }

    Ok(into_text(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields its data, then reports `WouldBlock` like an empty O_NONBLOCK pipe
    struct NonBlocking<'a> {
        data: &'a [u8],
    }

    impl Read for NonBlocking<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn slurp_reads_to_eof_and_trims() {
        let text = slurp(&b"hello world\n\n"[..]).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn slurp_keeps_inner_newlines() {
        let text = slurp(&b"line one\nline two\n"[..]).unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn slurp_stops_on_would_block() {
        let text = slurp(NonBlocking { data: b"partial" }).unwrap();
        assert_eq!(text, "partial");
    }

    #[test]
    fn slurp_replaces_invalid_utf8() {
        let text = slurp(&b"caf\xe9"[..]).unwrap();
        assert_eq!(text, "caf\u{fffd}");
    }

    #[test]
    fn slurp_reads_more_than_one_chunk() {
        let data = vec![b'a'; READ_CHUNK * 3 + 7];
        assert_eq!(slurp(&data[..]).unwrap().len(), data.len());
    }

    #[tokio::test]
    async fn run_command_captures_stdout() {
        let text = run_command("echo hello; echo world").await.unwrap();
        assert_eq!(text, "hello\nworld");
    }

    #[tokio::test]
    async fn run_command_keeps_output_of_failing_command() {
        let text = run_command("echo partial; exit 3").await.unwrap();
        assert_eq!(text, "partial");
    }

    #[tokio::test]
    async fn run_command_ignores_stderr() {
        let text = run_command("echo visible; echo hidden 1>&2").await.unwrap();
        assert_eq!(text, "visible");
    }
}
