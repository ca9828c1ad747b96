//! Error types for design loading and editing.

use weave_device::SiteId;

/// Errors that can occur when loading, saving, or editing a design.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// An I/O error occurred while reading or writing the design file.
    #[error("failed to access design: {0}")]
    IoError(#[from] std::io::Error),

    /// The JSON content could not be parsed or produced.
    #[error("failed to parse design: {0}")]
    ParseError(String),

    /// An instance with this name already exists.
    #[error("duplicate instance '{0}'")]
    DuplicateInstance(String),

    /// A net with this name already exists.
    #[error("duplicate net '{0}'")]
    DuplicateNet(String),

    /// Two instances were placed on the same site.
    #[error("site {site} is already occupied by '{occupant}'")]
    SiteOccupied {
        /// The contested site.
        site: SiteId,
        /// The instance already placed there.
        occupant: String,
    },

    /// A pin references an instance that does not exist.
    #[error("unknown instance '{0}'")]
    UnknownInstance(String),
}
