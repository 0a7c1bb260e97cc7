use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no clipboard tool found (tried pbcopy, wl-copy, xclip, xsel, clip)")]
    Unavailable,

    #[error("clipboard I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard tools, in lookup order, with the arguments they need
/// to read the selection from stdin.
const TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Pipes text into whichever clipboard tool is installed.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: PathBuf,
    args: &'static [&'static str],
}

impl SystemClipboard {
    pub fn detect() -> Result<Self, ClipboardError> {
        TOOLS
            .iter()
            .find_map(|&(name, args)| {
                which::which(name)
                    .ok()
                    .map(|program| Self { program, args })
            })
            .ok_or(ClipboardError::Unavailable)
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // reap the tool so it does not linger as a zombie
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(ClipboardError::ToolFailed {
                tool: self.program.display().to_string(),
                status: status.to_string(),
            });
        }
        tracing::debug!(tool = %self.program.display(), bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// In-process clipboard; keeps the last text written.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last_write() {
        let mut clip = MemoryClipboard::default();
        clip.write_text("one").unwrap();
        clip.write_text("two").unwrap();
        assert_eq!(clip.contents.as_deref(), Some("two"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_reported() {
        let mut clip = SystemClipboard {
            program: PathBuf::from("false"),
            args: &[],
        };
        match clip.write_text("x") {
            Err(ClipboardError::ToolFailed { .. }) | Err(ClipboardError::Io(_)) => {}
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_that_stops_reading_is_an_io_error() {
        // larger than any pipe buffer, so the write cannot complete
        let text = "x".repeat(4 * 1024 * 1024);
        let mut clip = SystemClipboard {
            program: PathBuf::from("true"),
            args: &[],
        };
        match clip.write_text(&text) {
            Err(ClipboardError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected broken pipe, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_receives_text() {
        let mut clip = SystemClipboard {
            program: PathBuf::from("cat"),
            args: &[],
        };
        assert!(clip.write_text("hello").is_ok());
    }
}
