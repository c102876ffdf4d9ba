use thiserror::Error;

/// Result type used across the synthesis engine
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// error types for formula parsing, molar masses and precursor mass calculations
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("precursor {formula:?} is not correctly formatted: {reason}")]
    MalformedPrecursorSpec { formula: String, reason: String },
    #[error("molar fraction of precursor {formula:?} could not be evaluated: {reason}")]
    InvalidMolarFractionFunction { formula: String, reason: String },
    #[error("the element {element:?} could not be found in the table of atomic weights")]
    UnknownElement { element: String },
    #[error("molar mass of the target composition is zero, target moles are undefined")]
    DegenerateTarget,
    #[error("{quantity} must be {expected}, got {value}")]
    InvalidRange {
        quantity: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("unexpected character {character:?} at position {position} of formula {formula:?}")]
    MalformedFormula {
        formula: String,
        position: usize,
        character: char,
    },
    #[error("unbalanced parentheses in formula {formula:?}")]
    UnbalancedParentheses { formula: String },
    #[error("molar fraction expression {expression:?} is invalid: {reason}")]
    InvalidExpression { expression: String, reason: String },
    #[error("synthesis task {path:?}: {reason}")]
    TaskFile { path: String, reason: String },
    #[error("setting {name:?} cannot be changed: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SynthesisError {
    pub(crate) fn unknown_element(element: &str) -> Self {
        Self::UnknownElement {
            element: element.to_owned(),
        }
    }

    pub(crate) fn malformed_precursor(formula: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPrecursorSpec {
            formula: formula.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_fraction(formula: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMolarFractionFunction {
            formula: formula.to_owned(),
            reason: reason.into(),
        }
    }
}
