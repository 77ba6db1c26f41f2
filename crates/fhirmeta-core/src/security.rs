//! Security context value model.
//!
//! Token parsing and claims extraction happen outside this core; the types
//! here only store what the external decoder produced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Summary of the authenticated user derived from token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhirUser {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub scopes: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub claims: BTreeMap<String, Value>,
}

impl FhirUser {
    pub fn new(user_id: impl Into<String>, scopes: BTreeSet<String>) -> Self {
        Self {
            user_id: user_id.into(),
            scopes,
            claims: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

/// A decoded JWT: header and payload as produced by the external decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jwt {
    pub header: Value,
    pub payload: Value,
}

impl Jwt {
    pub fn new(header: Value, payload: Value) -> Self {
        Self { header, payload }
    }
}

/// Immutable security context attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityContext {
    #[serde(rename = "securedAPICall")]
    secured: bool,
    #[serde(rename = "fhirUser", skip_serializing_if = "Option::is_none")]
    fhir_user: Option<FhirUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jwt: Option<Jwt>,
}

impl SecurityContext {
    /// Context for an unauthenticated call.
    pub fn anonymous() -> Self {
        Self {
            secured: false,
            fhir_user: None,
            jwt: None,
        }
    }

    /// Context for an authenticated call with its decoded token material.
    pub fn authenticated(fhir_user: FhirUser, jwt: Option<Jwt>) -> Self {
        Self {
            secured: true,
            fhir_user: Some(fhir_user),
            jwt,
        }
    }

    pub fn is_secured(&self) -> bool {
        self.secured
    }

    pub fn fhir_user(&self) -> Option<&FhirUser> {
        self.fhir_user.as_ref()
    }

    pub fn jwt(&self) -> Option<&Jwt> {
        self.jwt.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anonymous_context() {
        let ctx = SecurityContext::anonymous();
        assert!(!ctx.is_secured());
        assert!(ctx.fhir_user().is_none());
        assert!(ctx.jwt().is_none());
    }

    #[test]
    fn test_authenticated_context() {
        let user = FhirUser::new(
            "practitioner-7",
            BTreeSet::from(["patient/*.read".to_string()]),
        )
        .with_claim("iss", json!("https://auth.example.org"));
        let jwt = Jwt::new(json!({"alg": "RS256"}), json!({"sub": "practitioner-7"}));

        let ctx = SecurityContext::authenticated(user, Some(jwt));
        assert!(ctx.is_secured());
        assert!(ctx.fhir_user().unwrap().has_scope("patient/*.read"));
        assert!(!ctx.fhir_user().unwrap().has_scope("system/*.write"));
        assert_eq!(ctx.jwt().unwrap().payload["sub"], "practitioner-7");
    }

    #[test]
    fn test_serialization_wire_names() {
        let ctx = SecurityContext::anonymous();
        let j = serde_json::to_value(&ctx).unwrap();
        assert_eq!(j["securedAPICall"], false);
        assert!(j.get("fhirUser").is_none());
    }
}
