use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, ProfileResponse, RegisterRequest, RegisterResponse, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        password,
        repo::Usuario,
    },
    error::ApiError,
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = match payload.email {
        Some(e) if !e.is_empty() => e,
        _ => {
            warn!("register rejected: missing email");
            return Err(ApiError::MissingField);
        }
    };
    let plain = match payload.password {
        Some(p) if !p.is_empty() => p,
        _ => {
            warn!(%email, "register rejected: missing password");
            return Err(ApiError::MissingField);
        }
    };

    let timeout = state.config.store_timeout();
    if Usuario::find_by_email(&state.db, &email, timeout)
        .await?
        .is_some()
    {
        warn!(%email, "register rejected: already registered");
        return Err(ApiError::AlreadyExists);
    }

    let cost = state.config.bcrypt_cost;
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain, cost))
        .await
        .map_err(anyhow::Error::from)??;

    let user = Usuario::create(
        &state.db,
        &email,
        &hash,
        payload.rol.as_deref(),
        payload.lenguage.as_deref(),
        timeout,
    )
    .await?;

    info!(user_id = %user.id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user registered",
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let timeout = state.config.store_timeout();
    let user = Usuario::find_by_email(&state.db, &payload.email, timeout)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound
        })?;

    let stored = user.password_hash.clone();
    let plain = payload.password;
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
        .await
        .map_err(anyhow::Error::from)??;
    if !ok {
        warn!(email = %user.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredential);
    }

    let token = JwtKeys::from_ref(&state).sign(&user.email)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let timeout = state.config.store_timeout();
    let user = Usuario::find_by_email(&state.db, &email, timeout)
        .await?
        .ok_or_else(|| {
            // token outlived the account
            warn!(%email, "profile lookup: account no longer exists");
            ApiError::NotFound
        })?;

    info!(user_id = %user.id, %email, "profile returned");
    Ok(Json(ProfileResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
            rol: Some("dev".into()),
            lenguage: Some("en".into()),
        }
    }

    #[tokio::test]
    async fn register_rejects_missing_email() {
        let state = AppState::fake();
        let err = register(State(state), Json(register_payload(None, Some("pw1"))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingField));
    }

    #[tokio::test]
    async fn register_rejects_empty_email() {
        let state = AppState::fake();
        let err = register(State(state), Json(register_payload(Some(""), Some("pw1"))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingField));
    }

    #[tokio::test]
    async fn register_rejects_missing_password() {
        let state = AppState::fake();
        let err = register(State(state), Json(register_payload(Some("a@x.com"), None)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingField));
    }

    #[tokio::test]
    async fn register_rejects_empty_password() {
        let state = AppState::fake();
        let err = register(
            State(state),
            Json(register_payload(Some("a@x.com"), Some(""))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::MissingField));
    }
}
