//! Authentication middleware
//!
//! Validates Bearer tokens issued by the identity provider and derives the
//! caller's authorized warehouse scope from the token claims. Token
//! issuance happens outside this system; this layer only enforces the
//! scope it is handed.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::AuthorizedScope;

use crate::error::{AppError, ErrorResponse};

/// Authenticated identity extracted from JWT claims
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub company_code: String,
    pub center_code: String,
    pub warehouse_codes: Vec<String>,
}

impl AuthUser {
    /// Authorized scope for this session, derived once from the claims
    pub fn scope(&self) -> AuthorizedScope {
        AuthorizedScope {
            center_code: self.center_code.clone(),
            company_code: self.company_code.clone(),
            warehouse_codes: self.warehouse_codes.iter().cloned().collect(),
        }
    }
}

/// Authentication middleware that validates JWT tokens
///
/// The authorized-warehouse list travels inside the token, so scope
/// evaluation needs no database round trip per request.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("WSM__JWT__SECRET")
        .or_else(|_| std::env::var("WSM_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = match decode_jwt(token, &jwt_secret) {
        Ok(claims) => claims,
        Err(err) => {
            return err.into_response();
        }
    };

    let user_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            return AppError::Unauthorized("Invalid user ID in token".to_string()).into_response();
        }
    };

    let auth_user = AuthUser {
        user_id,
        company_code: claims.company_code,
        center_code: claims.center_code,
        warehouse_codes: claims.warehouse_codes,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// JWT claims structure
///
/// `warehouse_codes` is the authorized-warehouse list supplied by the
/// identity provider for this session.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub company_code: String,
    pub center_code: String,
    pub warehouse_codes: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: crate::error::ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Authentication required".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn claims_for(warehouses: &[&str]) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            company_code: "ACME".to_string(),
            center_code: "C01".to_string(),
            warehouse_codes: warehouses.iter().map(|s| s.to_string()).collect(),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_claims_round_trip() {
        let secret = "test-secret";
        let claims = claims_for(&["WH1", "WH2"]);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let decoded = decode_jwt(&token, secret).unwrap();
        assert_eq!(decoded.company_code, "ACME");
        assert_eq!(decoded.warehouse_codes, vec!["WH1", "WH2"]);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = claims_for(&["WH1"]);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        assert!(decode_jwt(&token, "secret-b").is_err());
    }

    #[test]
    fn test_expired_token_maps_to_token_expired() {
        let secret = "test-secret";
        let mut claims = claims_for(&["WH1"]);
        claims.exp = claims.iat - 7200;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            decode_jwt(&token, secret),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_scope_derived_from_claims() {
        let user = AuthUser {
            user_id: uuid::Uuid::new_v4(),
            company_code: "ACME".to_string(),
            center_code: "C01".to_string(),
            warehouse_codes: vec!["WH1".to_string()],
        };
        let scope = user.scope();
        assert!(scope.warehouse_codes.contains("WH1"));
        assert_eq!(scope.company_code, "ACME");
    }
}
