use thiserror::Error;

/// A reverse-geocode call failed.
///
/// Callers degrade to an empty address string; this never blocks an edit
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reverse geocode failed: {message}")]
pub struct GeocodeError {
    /// Vendor-reported reason.
    pub message: String,
}

impl GeocodeError {
    /// Wrap a vendor-reported failure reason.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single drive leg's routing call failed.
///
/// The affected segment degrades to a zero-length placeholder; sibling
/// segments are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("drive routing failed: {message}")]
pub struct DriveRoutingError {
    /// Vendor-reported reason.
    pub message: String,
}

impl DriveRoutingError {
    /// Wrap a vendor-reported failure reason.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from [`crate::provider::MapProvider::calculate_route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutePlanError {
    /// Routing needs a predecessor/successor pair to connect.
    #[error("route planning requires at least two nodes")]
    NotEnoughNodes,
}
