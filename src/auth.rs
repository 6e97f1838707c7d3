use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::services::{AdminError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Writer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "writer" | "author" => Ok(Role::Writer),
            "admin" => Ok(Role::Admin),
            other => Err(AdminError::PermissionDenied(format!("unknown role {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// Claims read from the platform's bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, alias = "unique_name")]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role"
    )]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Authenticated identity handed to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_name: String,
    pub role: Role,
    pub token: String,
}

impl Session {
    pub fn from_login(user_name: &str, resp: LoginResponse) -> ServiceResult<Self> {
        Ok(Self {
            user_name: user_name.to_string(),
            role: resp.role.parse()?,
            token: resp.token,
        })
    }

    /// Builds a session from a bare bearer token. The signature is not checked
    /// here; the API verifies it on every request.
    pub fn from_token(token: &str) -> ServiceResult<Self> {
        let claims = peek_claims(token)?;
        let role: Role = claims
            .role
            .as_deref()
            .ok_or_else(|| AdminError::PermissionDenied("token carries no role".into()))?
            .parse()?;
        Ok(Self {
            user_name: claims.name.or(claims.sub).unwrap_or_default(),
            role,
            token: token.to_string(),
        })
    }

    pub fn require(&self, allowed: &[Role]) -> ServiceResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AdminError::PermissionDenied(format!(
                "role {} may not open this view",
                self.role
            )))
        }
    }

    pub fn require_admin(&self) -> ServiceResult<()> {
        self.require(&[Role::Admin])
    }
}

fn peek_claims(token: &str) -> ServiceResult<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims = HashSet::new();
    validation.validate_aud = false;
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AdminError::PermissionDenied(format!("invalid token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_with(claims: serde_json::Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn role_claim_is_read_without_the_secret() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_with(json!({"sub": "7", "unique_name": "root", "role": "admin", "exp": exp}));
        let session = Session::from_token(&token).unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.user_name, "root");
        assert!(session.require_admin().is_ok());
    }

    #[test]
    fn aspnet_role_claim_is_accepted() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_with(json!({
            "sub": "reader-1",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Reader",
            "exp": exp
        }));
        let session = Session::from_token(&token).unwrap();
        assert_eq!(session.role, Role::Reader);
        assert_eq!(session.user_name, "reader-1");
        assert!(matches!(
            session.require_admin(),
            Err(AdminError::PermissionDenied(_))
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(Session::from_token("not-a-jwt").is_err());
    }

    #[test]
    fn login_response_maps_to_session() {
        let session = Session::from_login(
            "writer1",
            LoginResponse {
                token: "t".into(),
                role: "writer".into(),
            },
        )
        .unwrap();
        assert_eq!(session.role, Role::Writer);
        assert!(session.require(&[Role::Writer, Role::Admin]).is_ok());
        assert!(Session::from_login(
            "x",
            LoginResponse {
                token: "t".into(),
                role: "guest".into(),
            }
        )
        .is_err());
    }
}
