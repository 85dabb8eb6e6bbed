//! Error taxonomy for actions that cannot complete.
//!
//! Per-attempt conditions (no face, face too small, low confidence) are not
//! errors: the pipeline reports them as `PassOutcome`s and advisories. The
//! variants here block an action outright and travel inside `anyhow::Error`
//! so callers can `downcast_ref::<StyleError>()`.

/// Blocking failures surfaced by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleError {
    /// A model, the capture source, or another required collaborator failed to load.
    Initialization {
        component: &'static str,
        message: String,
    },
    /// A process/classify action was requested with no classifier slot active.
    NoModelSelected,
    /// Upload bytes were not a decodable image, or no upload is loaded.
    InvalidInput(String),
}

impl StyleError {
    /// Stable code for logs and machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            StyleError::Initialization { .. } => "INITIALIZATION_FAILURE",
            StyleError::NoModelSelected => "NO_MODEL_SELECTED",
            StyleError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    pub fn initialization(component: &'static str, err: &anyhow::Error) -> Self {
        StyleError::Initialization {
            component,
            message: format!("{:#}", err),
        }
    }
}

impl std::fmt::Display for StyleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleError::Initialization { component, message } => {
                write!(f, "{}: {} failed to load: {}", self.code(), component, message)
            }
            StyleError::NoModelSelected => {
                write!(f, "{}: select a model before analysing", self.code())
            }
            StyleError::InvalidInput(message) => write!(f, "{}: {}", self.code(), message),
        }
    }
}

impl std::error::Error for StyleError {}
