use crate::application::Clipboard;
use async_trait::async_trait;
use leadcard_errors::AppError;
use std::sync::Mutex;

/// Keeps the last copied text in memory; the server hands it back to the caller.
#[derive(Default)]
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
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), AppError> {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(text.to_string());
        Ok(())
    }
}

/// Writes to the desktop clipboard.
#[cfg(feature = "system-clipboard")]
#[derive(Default)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), AppError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| AppError::Clipboard(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Clipboard(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard_keeps_last_text() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("first").await.unwrap();
        clipboard.write_text("second").await.unwrap();

        assert_eq!(clipboard.contents().as_deref(), Some("second"));
    }
}
