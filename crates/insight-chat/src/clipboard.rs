//! Clipboard write capability.
//!
//! The session controller only ever writes text; hosts inject whichever
//! backend fits their platform.

use std::sync::{Arc, Mutex};

use crate::error::ClipboardError;

/// Scoped clipboard write.
pub trait Clipboard: Send + Sync {
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

// =============================================================================
// MemoryClipboard
// =============================================================================

/// In-process clipboard. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Unavailable(format!("clipboard lock poisoned: {}", e)))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

// =============================================================================
// SystemClipboard
// =============================================================================

/// The desktop clipboard, through `arboard`.
///
/// Every write opens its own clipboard handle and releases it before
/// returning, whether or not the write succeeded. Writes block while the
/// platform clipboard is busy; async callers run them off the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let mut handle = arboard::Clipboard::new()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        let written = handle
            .set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()));
        drop(handle);

        if written.is_ok() {
            tracing::debug!(text_len = text.len(), "Copied to system clipboard");
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_write() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.write("copied").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("copied"));
    }

    #[test]
    fn test_memory_clipboard_clones_share_contents() {
        let a = MemoryClipboard::new();
        let b = a.clone();
        a.write("shared").unwrap();
        assert_eq!(b.contents().as_deref(), Some("shared"));
    }

    #[test]
    fn test_system_clipboard_reports_failures_as_errors() {
        // Headless machines have no clipboard; either outcome is fine as long
        // as it comes back as a value.
        match SystemClipboard::new().write("copied") {
            Ok(()) => {}
            Err(ClipboardError::Unavailable(_)) | Err(ClipboardError::WriteFailed(_)) => {}
        }
    }
}
