use anyhow::{anyhow, Result};

/// System clipboard, opened on first use.
#[derive(Default)]
pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `text` and returns a status message describing what was copied.
    pub fn copy(&mut self, text: &str) -> Result<String> {
        let clipboard = match self.inner.as_mut() {
            Some(clipboard) => clipboard,
            None => {
                let clipboard = arboard::Clipboard::new()
                    .map_err(|e| anyhow!("Clipboard unavailable: {}", e))?;
                self.inner.insert(clipboard)
            }
        };
        if let Err(e) = clipboard.set_text(text) {
            // The handle may be stale (display server restarted); reopen next time.
            self.inner = None;
            return Err(anyhow!("Failed to copy: {}", e));
        }
        Ok(copy_summary(text))
    }
}

/// "Copied 2 lines, 14 chars"
pub fn copy_summary(text: &str) -> String {
    let lines = text.lines().count().max(1);
    let chars = text.chars().count();
    format!(
        "Copied {} line{}, {} char{}",
        lines,
        if lines == 1 { "" } else { "s" },
        chars,
        if chars == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_summary_pluralizes() {
        assert_eq!(copy_summary("a"), "Copied 1 line, 1 char");
        assert_eq!(copy_summary("ab\ncd"), "Copied 2 lines, 5 chars");
        assert_eq!(copy_summary(""), "Copied 1 line, 0 chars");
    }
}
