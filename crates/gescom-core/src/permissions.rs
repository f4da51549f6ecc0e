//! # Permissions
//!
//! Resolves a user's raw `droits` blob into a queryable permission set.
//!
//! Resolution order, first match wins:
//! 1. role `ADMIN` grants everything
//! 2. the literal `droits` value `TOUS` or `tous` grants everything
//! 3. a JSON object grants exactly the keys whose value is `true`
//! 4. anything else (missing, unparseable, non-object) grants nothing
//!
//! A screen with no required permission is open to every signed-in user.

use std::collections::HashSet;

use crate::types::Utilisateur;

// =============================================================================
// Permission
// =============================================================================

/// The ten access rights of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Utilisateurs,
    Factures,
    Clients,
    Produits,
    Stock,
    Rapports,
    Avoirs,
    Reglements,
    Comptoir,
    Devis,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
        Permission::Utilisateurs,
        Permission::Factures,
        Permission::Clients,
        Permission::Produits,
        Permission::Stock,
        Permission::Rapports,
        Permission::Avoirs,
        Permission::Reglements,
        Permission::Comptoir,
        Permission::Devis,
    ];

    /// Key under which this right appears in the `droits` JSON object.
    pub fn key(&self) -> &'static str {
        match self {
            Permission::Utilisateurs => "gestion_utilisateurs",
            Permission::Factures => "gestion_factures",
            Permission::Clients => "gestion_clients",
            Permission::Produits => "gestion_produits",
            Permission::Stock => "gestion_stock",
            Permission::Rapports => "gestion_rapports",
            Permission::Avoirs => "gestion_avoirs",
            Permission::Reglements => "gestion_reglements",
            Permission::Comptoir => "gestion_comptoir",
            Permission::Devis => "gestion_devis",
        }
    }

    /// French label shown in the rights editor.
    pub fn libelle(&self) -> &'static str {
        match self {
            Permission::Utilisateurs => "Gestion des utilisateurs",
            Permission::Factures => "Gestion des factures",
            Permission::Clients => "Gestion des clients",
            Permission::Produits => "Gestion des produits",
            Permission::Stock => "Gestion du stock",
            Permission::Rapports => "Gestion des rapports",
            Permission::Avoirs => "Gestion des avoirs",
            Permission::Reglements => "Gestion des règlements",
            Permission::Comptoir => "Gestion du comptoir",
            Permission::Devis => "Gestion des devis",
        }
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// The resolved permissions of one user.
///
/// Resolve once at login and query with [`PermissionSet::allows`]; the raw
/// blob never needs re-parsing per screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: HashSet<Permission>,
}

impl PermissionSet {
    /// Grants nothing.
    pub fn none() -> Self {
        PermissionSet::default()
    }

    /// Grants all ten rights.
    pub fn all() -> Self {
        PermissionSet {
            granted: Permission::ALL.into_iter().collect(),
        }
    }

    /// Resolves the raw role and `droits` blob.
    ///
    /// Only a strict JSON `true` grants a key. `false`, strings, numbers
    /// and unknown keys are ignored; an unparseable blob grants nothing
    /// rather than failing the login.
    pub fn resolve(role: Option<&str>, droits: Option<&str>) -> Self {
        if role == Some("ADMIN") {
            return PermissionSet::all();
        }

        match droits {
            Some("TOUS") | Some("tous") => PermissionSet::all(),
            Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Object(map)) => {
                    let granted = Permission::ALL
                        .into_iter()
                        .filter(|p| map.get(p.key()) == Some(&serde_json::Value::Bool(true)))
                        .collect();
                    PermissionSet { granted }
                }
                _ => PermissionSet::none(),
            },
            None => PermissionSet::none(),
        }
    }

    /// Resolves the permissions of a signed-in user.
    pub fn for_user(user: &Utilisateur) -> Self {
        PermissionSet::resolve(user.role.as_deref(), user.droits.as_deref())
    }

    /// Checks a screen's required right. `None` means the screen is open.
    pub fn allows(&self, required: Option<Permission>) -> bool {
        match required {
            None => true,
            Some(p) => self.granted.contains(&p),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_role_grants_everything() {
        let set = PermissionSet::resolve(Some("ADMIN"), None);
        for p in Permission::ALL {
            assert!(set.allows(Some(p)));
        }
    }

    #[test]
    fn test_tous_literal_grants_everything() {
        assert_eq!(PermissionSet::resolve(None, Some("TOUS")), PermissionSet::all());
        assert_eq!(PermissionSet::resolve(None, Some("tous")), PermissionSet::all());

        // Only the two exact spellings count
        assert!(PermissionSet::resolve(None, Some("Tous")).is_empty());
    }

    #[test]
    fn test_json_map_grants_only_strict_true() {
        let droits = r#"{
            "gestion_comptoir": true,
            "gestion_avoirs": false,
            "gestion_stock": "oui",
            "gestion_factures": 1
        }"#;
        let set = PermissionSet::resolve(Some("VENDEUR"), Some(droits));

        assert!(set.allows(Some(Permission::Comptoir)));
        assert!(!set.allows(Some(Permission::Avoirs)));
        assert!(!set.allows(Some(Permission::Stock)));
        assert!(!set.allows(Some(Permission::Factures)));
        assert!(!set.allows(Some(Permission::Clients)));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let set = PermissionSet::resolve(None, Some(r#"{"gestion_inconnue": true}"#));
        assert!(set.is_empty());
    }

    #[test]
    fn test_unparseable_droits_grant_nothing() {
        assert!(PermissionSet::resolve(None, Some("n'importe quoi")).is_empty());
        assert!(PermissionSet::resolve(None, Some("{invalide")).is_empty());
        assert!(PermissionSet::resolve(None, Some("null")).is_empty());
        assert!(PermissionSet::resolve(None, None).is_empty());
    }

    #[test]
    fn test_no_required_right_is_open() {
        assert!(PermissionSet::none().allows(None));
        assert!(!PermissionSet::none().allows(Some(Permission::Comptoir)));
    }

    #[test]
    fn test_keys_cover_all_rights() {
        for p in Permission::ALL {
            assert!(p.key().starts_with("gestion_"));
            assert!(!p.libelle().is_empty());
        }
    }

    #[test]
    fn test_for_user_reads_role_and_droits() {
        let user = crate::types::Utilisateur {
            id_utilisateur: 1,
            nom_utilisateur: "vendeur1".to_string(),
            role: Some("VENDEUR".to_string()),
            actif: true,
            droits: Some(r#"{"gestion_comptoir": true}"#.to_string()),
        };
        let set = PermissionSet::for_user(&user);

        assert!(set.allows(Some(Permission::Comptoir)));
        assert!(!set.allows(Some(Permission::Utilisateurs)));
    }
}
