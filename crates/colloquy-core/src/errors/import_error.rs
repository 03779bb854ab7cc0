/// Rejections raised while importing an exported user profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileImportError {
    #[error("malformed profile payload: {reason}")]
    Malformed { reason: String },

    #[error("missing field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
