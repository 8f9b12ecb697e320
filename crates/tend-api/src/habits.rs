//! Handlers for the habit CRUD endpoints.
//!
//! Every route requires a session and only ever sees the caller's own
//! habits; a habit owned by someone else is indistinguishable from one
//! that does not exist.
//!
//! | Method   | Path               | Notes                              |
//! |----------|--------------------|------------------------------------|
//! | `GET`    | `/api/habits`      | list, newest first                 |
//! | `POST`   | `/api/habits`      | create, 201 with the stored habit  |
//! | `GET`    | `/api/habits/{id}` | fetch one                          |
//! | `PUT`    | `/api/habits/{id}` | replace every editable field       |
//! | `DELETE` | `/api/habits/{id}` | delete the habit and its history   |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use tend_core::{
  habit::{Habit, HabitDraft},
  store::{AuthStore, HabitStore},
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// Handler for `GET /api/habits`.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
) -> Result<Json<Vec<Habit>>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let habits = state
    .store
    .list_habits(owner)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(habits))
}

/// Handler for `POST /api/habits`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Json(draft): Json<HabitDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let input = draft.validate()?;
  let habit = state
    .store
    .create_habit(owner, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(habit)))
}

/// Handler for `GET /api/habits/{id}`.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Habit>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let habit = state
    .store
    .get_habit(owner, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  Ok(Json(habit))
}

/// Handler for `PUT /api/habits/{id}`. Replaces all editable fields in
/// one go; `created_at` survives, `updated_at` moves.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
  Json(draft): Json<HabitDraft>,
) -> Result<Json<Habit>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let input = draft.validate()?;
  let habit = state
    .store
    .update_habit(owner, id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  Ok(Json(habit))
}

/// Handler for `DELETE /api/habits/{id}`. Completion history goes with
/// the habit.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_habit(owner, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!("habit {id} not found")));
  }
  Ok(Json(json!({ "message": "habit deleted" })))
}
