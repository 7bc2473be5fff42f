use crate::reference::ReferenceError;

/// Client input that cannot be scored as given.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid key structure: '{0}'. Expected format 'Domain-ImpactCriterion'")]
    MalformedKey(String),
    #[error("unknown impact criterion: '{0}'")]
    UnknownImpactCriterion(String),
    #[error("invalid numeric value for {field}: {value}")]
    NonNumeric { field: String, value: String },
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("invalid level number '{value}' for service '{service}'")]
    InvalidLevel { service: String, value: String },
    #[error("percentage for service '{service}' level {level} must be within 0-100, got {value}")]
    InvalidPercentage {
        service: String,
        level: u32,
        value: f64,
    },
    #[error("target SRI must be a finite number")]
    InvalidTarget,
    #[error("target SRI {target} must be greater than the current SRI {current}")]
    TargetNotAboveCurrent { target: f64, current: f64 },
}

/// Missing domain-weight row for a (building type, zone, domain) triple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "no weights found for building type '{building_type}', zone '{zone}' and domain '{domain}'"
)]
pub struct LookupError {
    pub building_type: String,
    pub zone: String,
    pub domain: String,
}

/// Any failure raised while evaluating, aggregating or searching.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl ScoringError {
    /// True when the caller supplied something unusable, as opposed to an internal fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Lookup(_))
    }
}
