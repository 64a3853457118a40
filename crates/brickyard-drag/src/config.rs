use std::fmt;

use brickyard_forest::SOCKET_CAPTURE_RADIUS;
use serde::{Deserialize, Serialize};

/// Pointer button reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Drag session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Sockets farther than this from the cursor are never offered.
    pub capture_radius: f64,
    /// Button required to begin a drag.
    pub activation_button: PointerButton,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            capture_radius: SOCKET_CAPTURE_RADIUS,
            activation_button: PointerButton::Primary,
        }
    }
}

impl DragConfig {
    /// Reject radii that would make the nearest search meaningless.
    pub fn validate(&self) -> Result<(), DragConfigError> {
        if !self.capture_radius.is_finite() || self.capture_radius <= 0.0 {
            return Err(DragConfigError::InvalidCaptureRadius {
                radius: self.capture_radius,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragConfigError {
    InvalidCaptureRadius { radius: f64 },
}

impl fmt::Display for DragConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCaptureRadius { radius } => {
                write!(f, "capture radius must be finite and > 0 (got {radius})")
            }
        }
    }
}

impl std::error::Error for DragConfigError {}
