//! Account registration and session handling.
//!
//! Sessions are opaque bearer tokens. The client holds the raw token (in
//! the `tend_session` cookie for browsers, or an `Authorization: Bearer`
//! header for anything else) while the store only ever sees its SHA-256
//! digest, so a leaked database does not leak live sessions. Passwords are
//! hashed with argon2 before they reach the store.
//!
//! | Method | Path                 | Notes                             |
//! |--------|----------------------|-----------------------------------|
//! | `POST` | `/api/auth/register` | create an account and sign it in  |
//! | `POST` | `/api/auth/login`    | open a fresh session              |
//! | `POST` | `/api/auth/logout`   | revoke the current session        |
//! | `GET`  | `/api/auth/me`       | describe the signed-in account    |

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest as _, Sha256};
use tend_core::{
  store::AuthStore,
  user::{User, validate_credentials},
};
use uuid::Uuid;

use crate::{AppState, ServerConfig, error::ApiError};

/// Name of the session cookie set on register and login.
pub const SESSION_COOKIE: &str = "tend_session";

// ─── Tokens and hashing ─────────────────────────────────────────────────────

/// Mint a fresh session token. Returns the raw token handed to the client
/// and the digest kept server-side.
fn mint_token() -> (String, String) {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  let raw = URL_SAFE_NO_PAD.encode(bytes);
  let digest = token_digest(&raw);
  (raw, digest)
}

/// SHA-256 hex digest of a raw session token.
pub fn token_digest(raw: &str) -> String {
  hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Hash a password into an argon2 PHC string.
fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}

/// Check a password against a stored PHC string. An unparseable stored
/// hash counts as a mismatch.
fn verify_password(password: &str, stored: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(stored) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Pull the raw session token off a request, preferring the
/// `Authorization: Bearer` header over the session cookie.
pub fn client_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "));
  if let Some(token) = bearer {
    return Some(token.to_string());
  }

  headers
    .get(header::COOKIE)
    .and_then(|value| value.to_str().ok())
    .and_then(|cookies| {
      cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
      })
    })
}

// ─── Cookies ────────────────────────────────────────────────────────────────

fn session_cookie(config: &ServerConfig, token: &str) -> String {
  let max_age = config.session_ttl_days * 86_400;
  let mut cookie = format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
  );
  if config.secure_cookies {
    cookie.push_str("; Secure");
  }
  cookie
}

fn clear_session_cookie(config: &ServerConfig) -> String {
  let mut cookie =
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
  if config.secure_cookies {
    cookie.push_str("; Secure");
  }
  cookie
}

// ─── Extractor ──────────────────────────────────────────────────────────────

/// The signed-in account, resolved from the request's session token.
/// Rejects with 401 when the token is missing, unknown, or expired.
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = client_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let user_id = state
      .store
      .resolve_session(&token_digest(&token))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;
    Ok(CurrentUser(user_id))
  }
}

// ─── Request and response bodies ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
  pub id:         Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
  fn from(user: User) -> Self {
    Self { id: user.id, email: user.email, created_at: user.created_at }
  }
}

/// Body returned by register and login. The token doubles as a bearer
/// credential for non-browser clients; browsers can rely on the cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
  pub token: String,
  pub user:  UserResponse,
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn open_session<S>(
  state: &AppState<S>,
  user_id: Uuid,
) -> Result<String, ApiError>
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  let (token, digest) = mint_token();
  let ttl = Duration::days(state.config.session_ttl_days);
  state
    .store
    .create_session(user_id, digest, ttl)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(token)
}

/// Handler for `POST /api/auth/register`. Creates the account and signs
/// it straight in, answering 201 with a session token and cookie.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  let email = validate_credentials(&body.email, &body.password)?;

  let taken = state
    .store
    .find_user(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some();
  if taken {
    return Err(ApiError::BadRequest("email already registered".to_string()));
  }

  let password_hash = hash_password(&body.password)?;
  let user = state
    .store
    .create_user(email, password_hash)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let token = open_session(&state, user.id).await?;
  Ok((
    StatusCode::CREATED,
    [(header::SET_COOKIE, session_cookie(&state.config, &token))],
    Json(SessionResponse { token, user: user.into() }),
  ))
}

/// Handler for `POST /api/auth/login`. Credential mismatch and unknown
/// email answer the same 401 so the endpoint does not confirm which
/// emails have accounts.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  let email = body.email.trim().to_lowercase();
  let user = state
    .store
    .find_user(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .filter(|user| verify_password(&body.password, &user.password_hash))
    .ok_or(ApiError::Unauthorized)?;

  let token = open_session(&state, user.id).await?;
  Ok((
    [(header::SET_COOKIE, session_cookie(&state.config, &token))],
    Json(SessionResponse { token, user: user.into() }),
  ))
}

/// Handler for `POST /api/auth/logout`. Revokes the presented session and
/// clears the cookie.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  let token = client_token(&headers).ok_or(ApiError::Unauthorized)?;
  let revoked = state
    .store
    .delete_session(&token_digest(&token))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !revoked {
    return Err(ApiError::Unauthorized);
  }

  Ok((
    [(header::SET_COOKIE, clear_session_cookie(&state.config))],
    Json(json!({ "message": "signed out" })),
  ))
}

/// Handler for `GET /api/auth/me`.
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, ApiError>
where
  S: AuthStore + Clone + Send + Sync + 'static,
{
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;
  Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
      map.insert(name.clone(), value.parse().unwrap());
    }
    map
  }

  #[test]
  fn bearer_header_wins_over_cookie() {
    let map = headers(&[
      (header::AUTHORIZATION, "Bearer from-header"),
      (header::COOKIE, "tend_session=from-cookie"),
    ]);
    assert_eq!(client_token(&map).as_deref(), Some("from-header"));
  }

  #[test]
  fn session_cookie_is_found_among_other_cookies() {
    let map = headers(&[(
      header::COOKIE,
      "theme=dark; tend_session=tok123; lang=en",
    )]);
    assert_eq!(client_token(&map).as_deref(), Some("tok123"));
  }

  #[test]
  fn non_bearer_authorization_falls_back_to_cookie() {
    let map = headers(&[
      (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
      (header::COOKIE, "tend_session=tok123"),
    ]);
    assert_eq!(client_token(&map).as_deref(), Some("tok123"));
  }

  #[test]
  fn no_credentials_yields_none() {
    assert_eq!(client_token(&HeaderMap::new()), None);
    let map = headers(&[(header::COOKIE, "theme=dark")]);
    assert_eq!(client_token(&map), None);
  }

  #[test]
  fn minted_tokens_are_unique_and_digests_stable() {
    let (token_a, digest_a) = mint_token();
    let (token_b, _) = mint_token();
    assert_ne!(token_a, token_b);
    assert_eq!(digest_a, token_digest(&token_a));
    assert_ne!(digest_a, token_digest(&token_b));
  }

  #[test]
  fn password_hashing_round_trips() {
    let hash = hash_password("hunter2hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter2hunter2", &hash));
    assert!(!verify_password("wrong password", &hash));
  }

  #[test]
  fn unparseable_stored_hash_never_verifies() {
    assert!(!verify_password("anything", "not a phc string"));
  }

  #[test]
  fn secure_flag_follows_config() {
    let config = ServerConfig { secure_cookies: true, ..Default::default() };
    assert!(session_cookie(&config, "tok").ends_with("; Secure"));
    assert!(clear_session_cookie(&config).contains("Max-Age=0; Secure"));

    let config = ServerConfig::default();
    assert!(!session_cookie(&config, "tok").contains("Secure"));
  }
}
