//! Attester error type.
//!
//! Wraps the shared [`AttestError`] taxonomy together with the verifier's
//! [`VerifyError`], which is propagated without reinterpretation.

use attest_core::{
    AttestError, AuthorizationError, CrossCheckError, LifecycleError, PolicyError,
    ValidationError,
};
use attest_zkp::VerifyError;
use thiserror::Error;

/// Failure of an attester operation. Every failure discards all effects of
/// the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttesterError {
    /// Authorization, validation, cross-check, policy or lifecycle failure.
    #[error(transparent)]
    Attest(#[from] AttestError),

    /// The proof verifier rejected the proof or its inputs.
    #[error("proof error: {0}")]
    Proof(#[from] VerifyError),
}

macro_rules! from_category {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AttesterError {
                fn from(e: $ty) -> Self {
                    Self::Attest(AttestError::from(e))
                }
            }
        )*
    };
}

from_category!(
    AuthorizationError,
    ValidationError,
    CrossCheckError,
    PolicyError,
    LifecycleError,
);

impl AttesterError {
    /// The wrapped policy error, if this is one.
    pub fn as_policy(&self) -> Option<&PolicyError> {
        match self {
            Self::Attest(AttestError::Policy(e)) => Some(e),
            _ => None,
        }
    }

    /// The wrapped cross-check error, if this is one.
    pub fn as_cross_check(&self) -> Option<&CrossCheckError> {
        match self {
            Self::Attest(AttestError::CrossCheck(e)) => Some(e),
            _ => None,
        }
    }
}
