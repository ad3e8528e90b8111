pub mod document;
pub mod preferences;
pub mod save_file;

pub use document::{GameDocument, MoveEntry};
pub use preferences::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
