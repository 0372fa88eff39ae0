//! Desktop side effects triggered by result actions.

use clipboard_rs::{Clipboard, ClipboardContext};
use lantern_core::error::ActionError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Everything an action may ask of the desktop session.
pub trait Desktop: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), ActionError>;

    /// Opens a file or directory with its default application.
    fn open_path(&self, path: &Path) -> Result<(), ActionError>;

    /// Starts `program` detached from the launcher.
    fn launch(&self, program: &str, args: &[String]) -> Result<(), ActionError>;

    fn copy_text(&self, text: &str) -> Result<(), ActionError>;

    fn copy_files(&self, paths: &[PathBuf]) -> Result<(), ActionError>;
}

/// The real desktop: the platform opener and the system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        self.launch(OPENER, &[url.to_string()])
    }

    fn open_path(&self, path: &Path) -> Result<(), ActionError> {
        self.launch(OPENER, &[path.to_string_lossy().into_owned()])
    }

    fn launch(&self, program: &str, args: &[String]) -> Result<(), ActionError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ActionError::Launch {
                program: program.to_string(),
                source,
            })?;

        debug!("Launched {} {:?}", program, args);

        // Reap the child so it does not linger as a zombie.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn copy_text(&self, text: &str) -> Result<(), ActionError> {
        let ctx = ClipboardContext::new().map_err(|e| ActionError::Clipboard(e.to_string()))?;

        ctx.set_text(text.to_string())
            .map_err(|e| ActionError::Clipboard(e.to_string()))
    }

    fn copy_files(&self, paths: &[PathBuf]) -> Result<(), ActionError> {
        let ctx = ClipboardContext::new().map_err(|e| ActionError::Clipboard(e.to_string()))?;

        let file_strings: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        ctx.set_files(file_strings)
            .map_err(|e| ActionError::Clipboard(e.to_string()))
    }
}
