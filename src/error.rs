//! Error types for the controller crate.
//!
//! Nothing on the per-frame path returns these; they cover loading settings
//! and attaching a rig, which happen before the first frame.

use std::path::PathBuf;

/// Result type for controller setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, validating or saving [`crate::ControllerSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised while binding a loaded rig to the animation states.
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("rig has no clip named `{name}` for the idle state")]
    MissingDefaultClip { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Rig(#[from] RigError),
}
