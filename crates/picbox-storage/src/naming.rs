//! Stored filename generation.
//!
//! Format: `<epoch-millis><ext>` for [`FilenameStrategy::Timestamp`], and
//! `<epoch-millis>-<8 hex chars><ext>` for [`FilenameStrategy::TimestampRandom`].

use chrono::Utc;
use picbox_core::FilenameStrategy;
use rand::Rng;

/// Generate a stored filename for an upload whose original extension is `ext` (with the dot).
pub fn generate_filename(strategy: FilenameStrategy, ext: &str) -> String {
    generate_filename_at(strategy, ext, Utc::now().timestamp_millis())
}

/// Same as [`generate_filename`] for a fixed timestamp.
pub fn generate_filename_at(strategy: FilenameStrategy, ext: &str, millis: i64) -> String {
    match strategy {
        FilenameStrategy::Timestamp => format!("{}{}", millis, ext),
        FilenameStrategy::TimestampRandom => {
            let suffix: u32 = rand::rng().random();
            format!("{}-{:08x}{}", millis, suffix, ext)
        }
    }
}
