/// Application-level error carrying the process exit code.
///
/// Exit codes: 2 = usage/input/IO, 3 = no usable data, 4 = runtime
/// (terminal, network, numerics).
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why a single model fit was abandoned.
///
/// These never leave the fitter: a failed model is skipped for its group.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("underdetermined: {points} points for {params} parameters")]
    Underdetermined { points: usize, params: usize },

    #[error("expected {expected} starting parameters, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("non-finite {0}")]
    NonFinite(&'static str),

    #[error("stalled: no step reduces the cost (lambda={lambda:.1e})")]
    Stalled { lambda: f64 },

    #[error("evaluation budget of {0} exhausted")]
    BudgetExhausted(usize),
}
