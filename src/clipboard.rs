//! The clipboard capability: write-text only.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

use crate::error::ClipboardError;

/// Writes text to a clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The platform clipboard, reached through the usual command-line tools.
///
/// Tools are tried in order until one is found: `pbcopy` on macOS, `clip` on Windows,
/// `wl-copy`, `xclip` and `xsel` elsewhere.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tools: Vec<(String, Vec<String>)>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        let tools: Vec<(&str, Vec<&str>)> = if cfg!(target_os = "macos") {
            vec![("pbcopy", vec![])]
        } else if cfg!(target_os = "windows") {
            vec![("clip", vec![])]
        } else {
            vec![
                ("wl-copy", vec![]),
                ("xclip", vec!["-selection", "clipboard"]),
                ("xsel", vec!["--clipboard", "--input"]),
            ]
        };
        SystemClipboard {
            tools: tools
                .into_iter()
                .map(|(tool, args)| {
                    (tool.to_string(), args.into_iter().map(String::from).collect())
                })
                .collect(),
        }
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific command instead of the platform defaults.
    pub fn with_command(tool: impl Into<String>, args: &[&str]) -> Self {
        SystemClipboard {
            tools: vec![(tool.into(), args.iter().map(|a| a.to_string()).collect())],
        }
    }

    // `wl-copy` and `xclip` leave a child serving the selection. Only the foreground exit
    // status is awaited and no output pipe is shared with that child.
    fn pipe(tool: &str, args: &[String], text: &str) -> Result<(), PipeError> {
        let mut child = match Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(PipeError::Missing),
            Err(err) => return Err(PipeError::Failed(err.to_string())),
        };

        // stdin is dropped at the end of the closure so the tool sees EOF
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
        let status = child
            .wait()
            .map_err(|err| PipeError::Failed(err.to_string()))?;
        if !status.success() {
            return Err(PipeError::Failed(status.to_string()));
        }
        written.map_err(|err| PipeError::Failed(err.to_string()))
    }
}

enum PipeError {
    Missing,
    Failed(String),
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        for (tool, args) in &self.tools {
            match Self::pipe(tool, args, text) {
                Ok(()) => {
                    debug!(tool = %tool, "wrote clipboard");
                    return Ok(());
                }
                Err(PipeError::Missing) => {
                    debug!(tool = %tool, "clipboard tool missing, trying next")
                }
                Err(PipeError::Failed(reason)) => {
                    return Err(ClipboardError::Rejected {
                        tool: tool.clone(),
                        reason,
                    })
                }
            }
        }
        let tried: Vec<&str> = self.tools.iter().map(|(tool, _)| tool.as_str()).collect();
        Err(ClipboardError::Unavailable(tried.join(", ")))
    }
}

/// An in-process clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}
