use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::from_secs((config.ttl_minutes as u64) * 60),
        }
    }

    pub fn sign(&self, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%email, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => {
                // forged, garbage or expired: callers only see Unauthorized
                debug!(error = %err, "session token rejected");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

// "Bearer <token>" or the raw token itself are both accepted.
pub fn strip_scheme(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header)
}

/// Validates the Authorization header, yielding the token's subject email.
#[derive(Debug)]
pub struct AuthUser(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let email = keys.verify(strip_scheme(header))?;
        Ok(AuthUser(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("a@x.com").expect("sign");
        assert_eq!(keys.verify(&token).expect("verify"), "a@x.com");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys("secret-one").sign("a@x.com").expect("sign");
        assert!(make_keys("secret-two").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("a@x.com").expect("sign");
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let mut sig = parts[2].to_string();
        let first = sig.remove(0);
        let replacement = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}.{}{}", parts[0], parts[1], replacement, sig);
        assert!(keys.verify(&tampered).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "a@x.com".into(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn scheme_label_is_stripped_only_when_present() {
        assert_eq!(strip_scheme("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_scheme("abc.def.ghi"), "abc.def.ghi");
        // the label is case-sensitive; anything else is verified as-is
        assert_eq!(strip_scheme("bearer abc"), "bearer abc");
    }

    #[tokio::test]
    async fn extractor_rejects_missing_header() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder()
            .uri("/usuarios")
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn extractor_rejects_garbage_token() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder()
            .uri("/usuarios")
            .header(axum::http::header::AUTHORIZATION, "Bearer not-a-token")
            .body(())
            .unwrap()
            .into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn extractor_accepts_valid_token() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign("a@x.com").expect("sign");
        let (mut parts, _) = Request::builder()
            .uri("/usuarios")
            .header(
                axum::http::header::AUTHORIZATION,
                format!("Bearer {token}"),
            )
            .body(())
            .unwrap()
            .into_parts();
        let AuthUser(email) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(email, "a@x.com");
    }
}
