//! Error types for setup and backend failures.
//!
//! Only setup can fail. Transition-time races are absorbed by the state
//! machines' guards and never surface as errors.

use cam_events::CameraId;
use thiserror::Error;

/// A backend refused an allocation or binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("could not allocate {what}")]
    AllocationFailed { what: String },
    #[error("camera {camera} rejected its output binding")]
    BindingRejected { camera: CameraId },
}

/// Why a component came up disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A collaborator named in the configuration does not exist in the scene.
    #[error("{component}: missing {what}")]
    MissingReference { component: String, what: String },
    /// A list the component cycles through has no entries.
    #[error("{component}: nothing to cycle")]
    EmptyCollection { component: String },
    /// A backend failed while the component was being wired.
    #[error("{component}: {source}")]
    Render {
        component: String,
        #[source]
        source: RenderError,
    },
}

impl SetupError {
    pub fn missing(component: impl Into<String>, what: impl Into<String>) -> Self {
        SetupError::MissingReference {
            component: component.into(),
            what: what.into(),
        }
    }

    pub fn empty(component: impl Into<String>) -> Self {
        SetupError::EmptyCollection {
            component: component.into(),
        }
    }

    pub fn render(component: impl Into<String>, source: RenderError) -> Self {
        SetupError::Render {
            component: component.into(),
            source,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Error that can occur during TOML serialization.
#[derive(Debug, Error)]
#[error("TOML serialize error: {0}")]
pub struct TomlSerializeError(#[from] pub toml::ser::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_message() {
        let err = SetupError::missing("feed group Lobby", "monitor");
        assert_eq!(err.to_string(), "feed group Lobby: missing monitor");
    }

    #[test]
    fn test_render_error_is_source() {
        use std::error::Error as _;

        let err = SetupError::render(
            "camcorder",
            RenderError::AllocationFailed {
                what: "surface".to_string(),
            },
        );
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "camcorder: could not allocate surface");
    }
}
