//! Upload allow-list
//!
//! A single alternation (for example `jpeg|jpg|png|gif`) gates both the extension of the
//! client's original filename and the declared media type. Both checks must pass: either one on
//! its own is trivially spoofed by a misbehaving client.

use regex::Regex;

use crate::error::AppError;
use crate::naming::original_extension;

#[derive(Clone, Debug)]
pub struct AllowList {
    pattern: String,
    extension: Regex,
    media_type: Regex,
}

impl AllowList {
    /// Compile an allow-list from an alternation of lowercase type names.
    pub fn new(pattern: &str) -> Result<Self, anyhow::Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(anyhow::anyhow!("Allow-list pattern cannot be empty"));
        }

        let extension = Regex::new(&format!(r"(?i)^\.(?:{})$", pattern))
            .map_err(|e| anyhow::anyhow!("Invalid allow-list pattern '{}': {}", pattern, e))?;
        let media_type = Regex::new(&format!(r"(?i)^image/(?:{})$", pattern))
            .map_err(|e| anyhow::anyhow!("Invalid allow-list pattern '{}': {}", pattern, e))?;

        Ok(Self {
            pattern: pattern.to_string(),
            extension,
            media_type,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// `ext` includes the leading dot, as returned by [`original_extension`].
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.extension.is_match(ext)
    }

    /// Parameters (`; charset=...`) are ignored.
    pub fn allows_media_type(&self, content_type: &str) -> bool {
        let normalized = content_type
            .split(';')
            .next()
            .map(str::trim)
            .unwrap_or(content_type);
        self.media_type.is_match(normalized)
    }

    /// Check an incoming file. Returns the original extension on success.
    pub fn check<'a>(
        &self,
        original_filename: &'a str,
        content_type: &str,
    ) -> Result<&'a str, AppError> {
        let ext = original_extension(original_filename);
        let ext_ok = ext.map(|e| self.allows_extension(e)).unwrap_or(false);
        let type_ok = self.allows_media_type(content_type);

        match ext {
            Some(ext) if ext_ok && type_ok => Ok(ext),
            _ => Err(AppError::UnsupportedFileType {
                filename: original_filename.to_string(),
                content_type: content_type.to_string(),
            }),
        }
    }
}
