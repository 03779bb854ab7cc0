/// Failures raised by specialized domain advisors.
#[derive(Debug, thiserror::Error)]
pub enum DelegationError {
    #[error("advisor {advisor} failed: {reason}")]
    AdvisorFailed { advisor: String, reason: String },

    #[error("advisor {advisor} has no answer for the request")]
    NoAnswer { advisor: String },
}
