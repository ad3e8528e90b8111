use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{GameError, Result};
use crate::persistence::document::GameDocument;

/// Reads and parses a saved game. Any failure is a `Load` error.
pub fn read<P: AsRef<Path>>(path: P) -> Result<GameDocument> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| GameError::Load(format!("{}: {e}", path.display())))?;
    let document = GameDocument::from_json(&text)
        .map_err(|e| GameError::Load(format!("{}: {e}", path.display())))?;
    debug!("read {} moves from {}", document.moves.len(), path.display());
    Ok(document)
}

/// Writes a saved game, replacing any existing file.
pub fn write<P: AsRef<Path>>(path: P, document: &GameDocument) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, document.to_json()?)?;
    debug!("wrote {} moves to {}", document.moves.len(), path.display());
    Ok(())
}
