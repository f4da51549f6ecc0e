//! # Authentication Session
//!
//! Login request/response contracts and the authenticated session held by
//! [`crate::backend::BackendClient`].
//!
//! The backend issues an opaque bearer token on `POST /api/auth/login` and
//! expects it back in the `Authorization` header on every call. Permissions
//! are resolved once at login from the user's `role` and `droits` columns;
//! the backend does not re-check them per endpoint, the terminal does.

use gescom_core::{Permission, PermissionSet, Utilisateur};
use serde::{Deserialize, Serialize};

// =============================================================================
// Wire Contracts
// =============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub nom_utilisateur: String,
    pub mot_de_passe: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub utilisateur: Utilisateur,
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated backend session.
///
/// Built from the login response; permissions are resolved once here so the
/// terminal never re-parses the `droits` JSON on every menu render.
#[derive(Debug, Clone)]
pub struct AuthSession {
    token: String,
    utilisateur: Utilisateur,
    permissions: PermissionSet,
}

impl AuthSession {
    /// The raw bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The logged-in user.
    pub fn utilisateur(&self) -> &Utilisateur {
        &self.utilisateur
    }

    /// The resolved permission set.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Whether this session may use the given screen.
    ///
    /// `None` means the screen is not permission-gated.
    pub fn allows(&self, permission: Option<Permission>) -> bool {
        self.permissions.allows(permission)
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<LoginResponse> for AuthSession {
    fn from(resp: LoginResponse) -> Self {
        let permissions = PermissionSet::for_user(&resp.utilisateur);
        AuthSession {
            token: resp.access_token,
            utilisateur: resp.utilisateur,
            permissions,
        }
    }
}
