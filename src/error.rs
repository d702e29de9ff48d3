use thiserror::Error;

pub type SimResult<T> = std::result::Result<T, SimError>;

/// Failures reported synchronously by the simulation core. Nothing is mutated
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("model slot already holds entity {0}")]
    ModelSlotOccupied(u32),
}

impl SimError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SimError::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SimError::InvalidArgument(_))
    }
}

pub(crate) fn ensure_finite_vec3(label: &str, value: glam::Vec3) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(format!("{label} must be finite, got {value:?}")))
    }
}

pub(crate) fn ensure_finite(label: &str, value: f32) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(format!("{label} must be finite, got {value}")))
    }
}
