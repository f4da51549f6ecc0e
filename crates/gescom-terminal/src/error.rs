//! # Terminal Error Types
//!
//! The terminal surfaces exactly two failure families to the operator:
//! domain rules from `gescom-core` (recoverable by correcting the input) and
//! backend failures from `gescom-client` (abandon the operation, local state
//! untouched, retry by hand). Plus one interaction outcome of its own: a
//! mode switch that needs an explicit confirmation.

use gescom_client::ClientError;
use gescom_core::CoreError;
use thiserror::Error;

/// Result type alias for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Error type for terminal session and workflow operations.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// A business rule refused the operation (message is operator-facing
    /// French, verbatim from the core engines).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backend call failed. `network` distinguishes "never reached the
    /// backend" (safe to retry, nothing changed) from "the backend said no".
    #[error("{message}")]
    Backend { message: String, network: bool },

    /// The cart still has lines; switching mode would drop them. The caller
    /// retries with `confirm_clear = true` once the operator agrees.
    #[error("Le panier n'est pas vide. Confirmez le changement de mode pour le vider.")]
    SwitchNeedsConfirmation,
}

impl From<ClientError> for TerminalError {
    fn from(err: ClientError) -> Self {
        let network = err.is_network();
        // Prefer the backend's French detail over the transport wrapper.
        let message = match err.detail() {
            Some(detail) => detail.to_string(),
            None => err.to_string(),
        };
        TerminalError::Backend { message, network }
    }
}

impl TerminalError {
    /// True when the backend was never reached; the operation left no trace
    /// and can be retried as-is.
    pub fn is_network(&self) -> bool {
        matches!(self, TerminalError::Backend { network: true, .. })
    }

    /// True for rule violations the operator can fix by changing the input.
    pub fn is_domain(&self) -> bool {
        matches!(self, TerminalError::Core(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_conversion_keeps_detail() {
        let err = TerminalError::from(ClientError::Rejected {
            status: 400,
            detail: "Cet avoir a déjà été traité".to_string(),
        });
        assert_eq!(err.to_string(), "Cet avoir a déjà été traité");
        assert!(!err.is_network());

        let err = TerminalError::from(ClientError::ConnectionFailed("refused".to_string()));
        assert!(err.is_network());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err = TerminalError::from(CoreError::EmptyCart);
        assert!(err.is_domain());
        assert_eq!(err.to_string(), "Le panier est vide");
    }
}
