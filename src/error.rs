use thiserror::Error;

use crate::{mx, smtp};

/// Top-level error for a verification call. Callers branch on the kind:
/// DNS-level failures mean the domain itself could not be assessed, SMTP
/// failures mean the assessment ran but did not conclude.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Mx(#[from] mx::Error),
    #[error(transparent)]
    Smtp(smtp::SmtpError),
}

impl From<smtp::SmtpError> for VerifyError {
    fn from(err: smtp::SmtpError) -> Self {
        match err {
            smtp::SmtpError::Mx(inner) => Self::Mx(inner),
            other => Self::Smtp(other),
        }
    }
}
