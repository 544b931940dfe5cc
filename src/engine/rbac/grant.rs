//! Grant Sets
//!
//! The roles and permissions a verified principal holds for one decision,
//! and the claim strings credentials carry them in. Signature and expiry
//! checks happen before anything here sees a credential.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::error::ClaimError;
use super::model::{Permission, Role};

/// Separator between resource id and tag in a resource-scoped claim
pub const CLAIM_SEPARATOR: &str = "||";

/// A role held on one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRole {
    pub role: Role,
    pub resource_id: String,
}

/// A permission held directly on one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermission {
    pub permission: Permission,
    pub resource_id: String,
}

/// Everything a principal holds, as handed to the decision procedure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSet {
    #[serde(default)]
    pub global_roles: BTreeSet<Role>,
    #[serde(default)]
    pub resource_roles: Vec<ResourceRole>,
    #[serde(default)]
    pub resource_permissions: Vec<ResourcePermission>,
}

impl GrantSet {
    /// A grant set holding nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_global_role(mut self, role: Role) -> Self {
        self.global_roles.insert(role);
        self
    }

    pub fn with_resource_role(mut self, role: Role, resource_id: impl Into<String>) -> Self {
        self.resource_roles.push(ResourceRole {
            role,
            resource_id: resource_id.into(),
        });
        self
    }

    pub fn with_resource_permission(
        mut self,
        permission: Permission,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_permissions.push(ResourcePermission {
            permission,
            resource_id: resource_id.into(),
        });
        self
    }

    pub fn global_role_list(&self) -> Vec<Role> {
        self.global_roles.iter().copied().collect()
    }

    /// Decode the claims of an already verified credential.
    pub fn from_claims(claims: &TokenClaims) -> Result<Self, ClaimError> {
        let global_roles = claims
            .global_roles
            .iter()
            .map(|tag| tag.parse::<Role>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        let resource_roles = claims
            .resource_roles
            .iter()
            .map(|claim| -> Result<ResourceRole, ClaimError> {
                let (resource_id, role) = decode_resource_claim::<Role>(claim)?;
                Ok(ResourceRole { role, resource_id })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resource_permissions = claims
            .resource_permissions
            .iter()
            .map(|claim| -> Result<ResourcePermission, ClaimError> {
                let (resource_id, permission) = decode_resource_claim::<Permission>(claim)?;
                Ok(ResourcePermission {
                    permission,
                    resource_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            global_roles,
            resource_roles,
            resource_permissions,
        })
    }

    /// Encode as claim strings
    pub fn to_claims(&self) -> TokenClaims {
        TokenClaims {
            global_roles: self.global_roles.iter().map(|r| r.to_string()).collect(),
            resource_roles: self
                .resource_roles
                .iter()
                .map(|rr| encode_resource_claim(&rr.resource_id, rr.role.as_str()))
                .collect(),
            resource_permissions: self
                .resource_permissions
                .iter()
                .map(|rp| encode_resource_claim(&rp.resource_id, rp.permission.as_str()))
                .collect(),
        }
    }
}

/// Claim lists as carried in a credential payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(default)]
    pub global_roles: Vec<String>,
    #[serde(default)]
    pub resource_roles: Vec<String>,
    #[serde(default)]
    pub resource_permissions: Vec<String>,
}

pub fn encode_resource_claim(resource_id: &str, tag: &str) -> String {
    format!("{resource_id}{CLAIM_SEPARATOR}{tag}")
}

/// Split `<resourceId>||<tag>` and parse the tag.
pub fn decode_resource_claim<T>(claim: &str) -> Result<(String, T), ClaimError>
where
    T: FromStr<Err = ClaimError>,
{
    let parts: Vec<&str> = claim.split(CLAIM_SEPARATOR).collect();
    match parts.as_slice() {
        [resource_id, tag] if !resource_id.is_empty() && !tag.is_empty() => {
            Ok((resource_id.to_string(), tag.parse()?))
        }
        _ => Err(ClaimError::MalformedClaim(claim.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_claim() {
        let (id, role) = decode_resource_claim::<Role>("project123||PROJECT_ADMIN").unwrap();
        assert_eq!(id, "project123");
        assert_eq!(role, Role::ProjectAdmin);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for claim in [
            "project123PROJECT_ADMIN",
            "||PROJECT_ADMIN",
            "project123||",
            "project123||PROJECT_ADMIN||extra",
        ] {
            assert_eq!(
                decode_resource_claim::<Role>(claim),
                Err(ClaimError::MalformedClaim(claim.to_string()))
            );
        }
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        assert!(matches!(
            decode_resource_claim::<Role>("p1||invalid_role"),
            Err(ClaimError::UnknownTag { kind: "Role", .. })
        ));
    }

    #[test]
    fn test_from_claims() {
        let claims = TokenClaims {
            global_roles: vec!["GENERAL_USER".into()],
            resource_roles: vec!["project123||PROJECT_ADMIN".into(), "project456||PROJECT_CONTRIBUTOR".into()],
            resource_permissions: vec!["project789||PROJECT_VIEW".into()],
        };
        let grants = GrantSet::from_claims(&claims).unwrap();

        assert_eq!(grants.global_roles, BTreeSet::from([Role::GeneralUser]));
        assert_eq!(
            grants.resource_roles,
            vec![
                ResourceRole { role: Role::ProjectAdmin, resource_id: "project123".into() },
                ResourceRole { role: Role::ProjectContributor, resource_id: "project456".into() },
            ]
        );
        assert_eq!(grants.resource_permissions[0].permission, Permission::ProjectView);
        assert_eq!(grants.to_claims(), claims);
    }

    #[test]
    fn test_from_claims_rejects_bad_global_role() {
        let claims = TokenClaims {
            global_roles: vec!["INVALID_ROLE".into()],
            ..TokenClaims::default()
        };
        assert!(GrantSet::from_claims(&claims).is_err());
    }

    #[test]
    fn test_claims_json_defaults_missing_lists() {
        let claims: TokenClaims = serde_json::from_str(r#"{"globalRoles":["GENERAL_ADMIN"]}"#).unwrap();
        assert!(claims.resource_roles.is_empty());
        assert!(claims.resource_permissions.is_empty());
    }
}
