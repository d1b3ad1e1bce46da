//! Filename conventions shared by the upload pipeline and the storage layer.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Extensions returned by the photo listing (compared case-insensitively).
pub const LISTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// How stored filenames are generated.
///
/// Both strategies keep the original extension. `Timestamp` is `<epoch-millis><ext>`; two uploads
/// landing in the same millisecond get the same name and the later one replaces the earlier.
/// `TimestampRandom` appends a random hex suffix to the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameStrategy {
    Timestamp,
    #[default]
    TimestampRandom,
}

impl FromStr for FilenameStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" => Ok(FilenameStrategy::Timestamp),
            "timestamp-random" | "timestamp_random" => Ok(FilenameStrategy::TimestampRandom),
            _ => Err(anyhow::anyhow!("Invalid filename strategy: {}", s)),
        }
    }
}

impl Display for FilenameStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FilenameStrategy::Timestamp => write!(f, "timestamp"),
            FilenameStrategy::TimestampRandom => write!(f, "timestamp-random"),
        }
    }
}

/// Extension of a client supplied filename, including the leading dot, case preserved.
///
/// Only the last path component is considered (clients sometimes send full paths, with either
/// separator). Dotfiles without a further extension have none. Anything after the last dot that
/// is not plain ASCII alphanumerics is treated as no extension at all.
pub fn original_extension(filename: &str) -> Option<&str> {
    let basename = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let dot = basename.rfind('.')?;
    if dot == 0 {
        return None;
    }

    let ext = &basename[dot..];
    let body = &ext[1..];
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Whether a stored filename belongs in the photo listing.
pub fn is_listed_photo(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            LISTED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
