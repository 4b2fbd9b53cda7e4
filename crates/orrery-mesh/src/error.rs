/// Errors raised while building procedural geometry.
///
/// Every variant means the static scene description is wrong; callers treat it
/// as fatal at startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid geometry parameters for {shape}: {reason}")]
    InvalidGeometryParams { shape: &'static str, reason: String },
}

impl GeometryError {
    pub(crate) fn invalid(shape: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidGeometryParams {
            shape,
            reason: reason.into(),
        }
    }
}

/// Shared radius check: strictly positive and finite.
pub(crate) fn check_radius(
    shape: &'static str,
    name: &str,
    value: f32,
) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::invalid(
            shape,
            format!("{name} must be positive and finite, got {value}"),
        ))
    }
}
