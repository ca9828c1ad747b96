//! JSON loading and saving of designs.

use crate::design::Design;
use crate::error::DesignError;
use std::path::Path;

/// Loads a design from a JSON file.
pub fn load_design(path: &Path) -> Result<Design, DesignError> {
    let content = std::fs::read_to_string(path)?;
    design_from_str(&content)
}

/// Parses a design from JSON and rebuilds its site index.
pub fn design_from_str(content: &str) -> Result<Design, DesignError> {
    let mut design: Design =
        serde_json::from_str(content).map_err(|e| DesignError::ParseError(e.to_string()))?;
    design.rebuild_indices()?;
    Ok(design)
}

/// Writes a design as pretty-printed JSON.
pub fn save_design(design: &Design, path: &Path) -> Result<(), DesignError> {
    let json =
        serde_json::to_string_pretty(design).map_err(|e| DesignError::ParseError(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}
