//! Handlers for completion days and per-habit statistics.
//!
//! Completion writes are idempotent: marking a day twice or unmarking a
//! day that was never marked both succeed and answer with the resulting
//! set, so clients can retry freely.
//!
//! | Method   | Path                                  | Notes              |
//! |----------|---------------------------------------|--------------------|
//! | `GET`    | `/api/habits/{id}/completions`        | full history       |
//! | `POST`   | `/api/habits/{id}/completions`        | mark a day done    |
//! | `DELETE` | `/api/habits/{id}/completions/{date}` | unmark a day       |
//! | `GET`    | `/api/habits/{id}/stats`              | streak and rate    |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tend_core::{
  dates::{DateSet, parse_day},
  habit::ValidationError,
  store::{AuthStore, HabitStore},
  tracker,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CompletionsResponse {
  pub completed_dates: DateSet,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkBody {
  /// The day to mark, as `YYYY-MM-DD` or an RFC 3339 timestamp.
  pub date: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
  pub completed_today: bool,
  pub streak:          u32,
  pub completion_rate: u8,
  pub window_days:     u32,
}

/// Handler for `GET /api/habits/{id}/completions`.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<CompletionsResponse>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let completed_dates = state
    .store
    .get_completions(owner, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  Ok(Json(CompletionsResponse { completed_dates }))
}

/// Handler for `POST /api/habits/{id}/completions`.
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<MarkBody>,
) -> Result<Json<CompletionsResponse>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let day = parse_day(&body.date).map_err(|_| ValidationError::DayMalformed)?;
  let completed_dates = state
    .store
    .add_completion(owner, id, day)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  Ok(Json(CompletionsResponse { completed_dates }))
}

/// Handler for `DELETE /api/habits/{id}/completions/{date}`.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path((id, date)): Path<(Uuid, String)>,
) -> Result<Json<CompletionsResponse>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let day = parse_day(&date).map_err(|_| ValidationError::DayMalformed)?;
  let completed_dates = state
    .store
    .remove_completion(owner, id, day)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  Ok(Json(CompletionsResponse { completed_dates }))
}

/// Handler for `GET /api/habits/{id}/stats`. Streak and completion rate
/// are reckoned against the server's UTC calendar day.
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  CurrentUser(owner): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: HabitStore + AuthStore + Clone + Send + Sync + 'static,
{
  let days = state
    .store
    .get_completions(owner, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;

  let today = Utc::now().date_naive();
  let completion_rate =
    tracker::completion_rate(&days, tracker::DEFAULT_RATE_WINDOW, today)
      .map_err(|e| ApiError::Internal(e.to_string()))?;

  Ok(Json(StatsResponse {
    completed_today: tracker::completed_on(&days, today),
    streak: tracker::current_streak(&days, today),
    completion_rate,
    window_days: tracker::DEFAULT_RATE_WINDOW,
  }))
}
