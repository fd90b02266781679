use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Usuario;

/// Body of `POST /usuarios`. Everything is optional so that an absent email
/// or password becomes a domain error instead of a deserialization reject.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub rol: Option<String>,
    pub lenguage: Option<String>,
}

/// Body of `POST /login`. An absent email falls through to the not-found
/// path, the same way an unknown identifier does.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: Usuario,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUsuario,
}

/// Public projection returned by `GET /usuarios`.
#[derive(Debug, Serialize)]
pub struct PublicUsuario {
    pub id: Uuid,
    pub email: String,
    pub rol: Option<String>,
    pub lenguage: Option<String>,
}

impl From<Usuario> for PublicUsuario {
    fn from(u: Usuario) -> Self {
        Self {
            id: u.id,
            email: u.email,
            rol: u.rol,
            lenguage: u.lenguage,
        }
    }
}
