//! Error types for device loading and validation.

/// Errors that can occur when loading or validating a device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// An I/O error occurred while reading the device file.
    #[error("failed to read device: {0}")]
    IoError(#[from] std::io::Error),

    /// The JSON content could not be parsed.
    #[error("failed to parse device: {0}")]
    ParseError(String),

    /// The device is structurally inconsistent.
    #[error("invalid device: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid() {
        let err = DeviceError::Invalid("duplicate tile name 'INT_X0Y0'".into());
        assert_eq!(
            format!("{err}"),
            "invalid device: duplicate tile name 'INT_X0Y0'"
        );
    }
}
