//! HTTP JSON API for the Tend habit tracker.
//!
//! The crate exposes [`router`], an axum [`Router`] generic over any store
//! implementing [`HabitStore`](tend_core::store::HabitStore) and
//! [`AuthStore`](tend_core::store::AuthStore), plus the `tend-server`
//! binary that serves it on top of SQLite.
//!
//! | Method   | Path                                  | Auth | Notes                      |
//! |----------|---------------------------------------|------|----------------------------|
//! | `GET`    | `/health`                             |      | liveness probe             |
//! | `POST`   | `/api/auth/register`                  |      | create an account, 201     |
//! | `POST`   | `/api/auth/login`                     |      | open a session             |
//! | `POST`   | `/api/auth/logout`                    | yes  | revoke the session         |
//! | `GET`    | `/api/auth/me`                        | yes  | current account            |
//! | `GET`    | `/api/habits`                         | yes  | list habits, newest first  |
//! | `POST`   | `/api/habits`                         | yes  | create a habit, 201        |
//! | `GET`    | `/api/habits/{id}`                    | yes  | fetch one habit            |
//! | `PUT`    | `/api/habits/{id}`                    | yes  | replace a habit            |
//! | `DELETE` | `/api/habits/{id}`                    | yes  | delete habit and history   |
//! | `GET`    | `/api/habits/{id}/completions`        | yes  | completion days            |
//! | `POST`   | `/api/habits/{id}/completions`        | yes  | mark a day done            |
//! | `DELETE` | `/api/habits/{id}/completions/{date}` | yes  | unmark a day               |
//! | `GET`    | `/api/habits/{id}/stats`              | yes  | streak and completion rate |

pub mod auth;
pub mod completions;
pub mod error;
pub mod habits;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, header},
  routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tend_core::store::{AuthStore, HabitStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use crate::error::ApiError;

/// Runtime configuration, deserialised from `config.toml` and `TEND_*`
/// environment variables. Every field has a default so a bare
/// `tend-server` starts a working local instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Path of the SQLite database file.
  pub store_path:       PathBuf,
  /// Exact origin allowed to make credentialed browser requests. CORS
  /// headers are omitted entirely when unset.
  pub cors_origin:      Option<String>,
  pub session_ttl_days: i64,
  /// Mark session cookies `Secure`, for deployments behind TLS.
  pub secure_cookies:   bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             4000,
      store_path:       PathBuf::from("tend.db"),
      cors_origin:      None,
      session_ttl_days: 30,
      secure_cookies:   false,
    }
  }
}

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

/// Handler for `GET /health`.
async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

/// Credentialed CORS requires a literal origin, so there is no wildcard
/// mode; an unparseable origin is dropped with a warning.
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
  let raw = config.cors_origin.as_deref()?;
  let origin = match raw.parse::<HeaderValue>() {
    Ok(origin) => origin,
    Err(_) => {
      tracing::warn!("ignoring unparseable cors_origin {raw:?}");
      return None;
    }
  };

  Some(
    CorsLayer::new()
      .allow_origin(origin)
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
      .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
      .allow_credentials(true),
  )
}

/// Build the service router over any conforming store.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let routes = Router::new()
    .route("/health", get(health))
    .route("/api/auth/register", post(auth::register::<S>))
    .route("/api/auth/login", post(auth::login::<S>))
    .route("/api/auth/logout", post(auth::logout::<S>))
    .route("/api/auth/me", get(auth::me::<S>))
    .route(
      "/api/habits",
      get(habits::list::<S>).post(habits::create::<S>),
    )
    .route(
      "/api/habits/{id}",
      get(habits::get_one::<S>)
        .put(habits::update_one::<S>)
        .delete(habits::delete_one::<S>),
    )
    .route(
      "/api/habits/{id}/completions",
      get(completions::list::<S>).post(completions::add::<S>),
    )
    .route(
      "/api/habits/{id}/completions/{date}",
      delete(completions::remove::<S>),
    )
    .route("/api/habits/{id}/stats", get(completions::stats::<S>))
    .layer(TraceLayer::new_for_http());

  let routes = match cors_layer(&state.config) {
    Some(cors) => routes.layer(cors),
    None => routes,
  };

  routes.with_state(state)
}
