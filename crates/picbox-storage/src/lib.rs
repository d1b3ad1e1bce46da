//! Picbox Storage Library
//!
//! Storage abstraction and the local filesystem implementation backing the upload directory.
//!
//! # Filename rules
//!
//! Files live flat in a single directory. A filename handed to the storage layer must be a
//! single, non-hidden path component: no separators, no `..`, no leading `.`. Hidden names are
//! reserved for in-flight uploads, which are written to `.upload-<uuid>.part` and renamed into
//! place on commit.

pub mod factory;
pub mod local;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use naming::{generate_filename, generate_filename_at};
pub use traits::{ByteStream, Storage, StorageError, StorageResult, StoredFile, UploadSink};
