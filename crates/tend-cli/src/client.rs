//! Async HTTP client wrapping the tend JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tend_core::{
  dates::DateSet,
  habit::{Habit, HabitDraft},
};
use uuid::Uuid;

/// Connection settings for the tend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Saved session token, if signed in.
  pub token:    Option<String>,
}

/// The account half of a session response.
#[derive(Debug, Deserialize)]
pub struct UserInfo {
  pub id:    Uuid,
  pub email: String,
}

/// Body returned by register and login.
#[derive(Debug, Deserialize)]
pub struct SessionInfo {
  pub token: String,
  pub user:  UserInfo,
}

/// Body returned by the stats endpoint.
#[derive(Debug, Deserialize)]
pub struct HabitStats {
  pub completed_today: bool,
  pub streak:          u32,
  pub completion_rate: u8,
  pub window_days:     u32,
}

#[derive(Debug, Deserialize)]
struct CompletionsBody {
  completed_dates: DateSet,
}

/// The `{"error": ...}` body every failure answers with.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

/// Turn a failed response into an error carrying the server's message.
async fn api_error(what: &str, resp: reqwest::Response) -> anyhow::Error {
  let status = resp.status();
  match resp.json::<ErrorBody>().await {
    Ok(body) => anyhow!("{what} → {status}: {}", body.error),
    Err(_) => anyhow!("{what} → {status}"),
  }
}

/// Async HTTP client for the tend JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Fail early with a hint when no session token is configured.
  pub fn signed_in(&self) -> Result<()> {
    if self.config.token.is_none() {
      bail!("not signed in: run `tend login <email>` first");
    }
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/register`
  pub async fn register(
    &self,
    email: &str,
    password: &str,
  ) -> Result<SessionInfo> {
    let resp = self
      .client
      .post(self.url("/auth/register"))
      .json(&json!({ "email": email, "password": password }))
      .send()
      .await
      .context("POST /auth/register failed")?;

    if !resp.status().is_success() {
      return Err(api_error("POST /auth/register", resp).await);
    }
    resp.json().await.context("deserialising session")
  }

  /// `POST /api/auth/login`
  pub async fn login(
    &self,
    email: &str,
    password: &str,
  ) -> Result<SessionInfo> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({ "email": email, "password": password }))
      .send()
      .await
      .context("POST /auth/login failed")?;

    if !resp.status().is_success() {
      return Err(api_error("POST /auth/login", resp).await);
    }
    resp.json().await.context("deserialising session")
  }

  /// `POST /api/auth/logout`
  pub async fn logout(&self) -> Result<()> {
    let resp = self
      .auth(self.client.post(self.url("/auth/logout")))
      .send()
      .await
      .context("POST /auth/logout failed")?;

    if !resp.status().is_success() {
      return Err(api_error("POST /auth/logout", resp).await);
    }
    Ok(())
  }

  /// `GET /api/auth/me`
  pub async fn me(&self) -> Result<UserInfo> {
    let resp = self
      .auth(self.client.get(self.url("/auth/me")))
      .send()
      .await
      .context("GET /auth/me failed")?;

    if !resp.status().is_success() {
      return Err(api_error("GET /auth/me", resp).await);
    }
    resp.json().await.context("deserialising account")
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  /// `GET /api/habits`
  pub async fn list_habits(&self) -> Result<Vec<Habit>> {
    let resp = self
      .auth(self.client.get(self.url("/habits")))
      .send()
      .await
      .context("GET /habits failed")?;

    if !resp.status().is_success() {
      return Err(api_error("GET /habits", resp).await);
    }
    resp.json().await.context("deserialising habits")
  }

  /// `GET /api/habits/{id}`
  pub async fn get_habit(&self, id: Uuid) -> Result<Habit> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/habits/{id}"))))
      .send()
      .await
      .context("GET /habits/{id} failed")?;

    if !resp.status().is_success() {
      return Err(api_error("GET /habits/{id}", resp).await);
    }
    resp.json().await.context("deserialising habit")
  }

  /// `POST /api/habits`
  pub async fn create_habit(&self, draft: &HabitDraft) -> Result<Habit> {
    let resp = self
      .auth(self.client.post(self.url("/habits")))
      .json(draft)
      .send()
      .await
      .context("POST /habits failed")?;

    if !resp.status().is_success() {
      return Err(api_error("POST /habits", resp).await);
    }
    resp.json().await.context("deserialising habit")
  }

  /// `PUT /api/habits/{id}`
  pub async fn update_habit(
    &self,
    id: Uuid,
    draft: &HabitDraft,
  ) -> Result<Habit> {
    let resp = self
      .auth(self.client.put(self.url(&format!("/habits/{id}"))))
      .json(draft)
      .send()
      .await
      .context("PUT /habits/{id} failed")?;

    if !resp.status().is_success() {
      return Err(api_error("PUT /habits/{id}", resp).await);
    }
    resp.json().await.context("deserialising habit")
  }

  /// `DELETE /api/habits/{id}`
  pub async fn delete_habit(&self, id: Uuid) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/habits/{id}"))))
      .send()
      .await
      .context("DELETE /habits/{id} failed")?;

    if !resp.status().is_success() {
      return Err(api_error("DELETE /habits/{id}", resp).await);
    }
    Ok(())
  }

  // ── Completions ───────────────────────────────────────────────────────────

  /// `GET /api/habits/{id}/completions`
  pub async fn completions(&self, id: Uuid) -> Result<DateSet> {
    let resp = self
      .auth(
        self
          .client
          .get(self.url(&format!("/habits/{id}/completions"))),
      )
      .send()
      .await
      .context("GET /habits/{id}/completions failed")?;

    if !resp.status().is_success() {
      return Err(api_error("GET /habits/{id}/completions", resp).await);
    }
    let body: CompletionsBody =
      resp.json().await.context("deserialising completions")?;
    Ok(body.completed_dates)
  }

  /// `POST /api/habits/{id}/completions`
  pub async fn add_completion(&self, id: Uuid, date: &str) -> Result<DateSet> {
    let resp = self
      .auth(
        self
          .client
          .post(self.url(&format!("/habits/{id}/completions"))),
      )
      .json(&json!({ "date": date }))
      .send()
      .await
      .context("POST /habits/{id}/completions failed")?;

    if !resp.status().is_success() {
      return Err(api_error("POST /habits/{id}/completions", resp).await);
    }
    let body: CompletionsBody =
      resp.json().await.context("deserialising completions")?;
    Ok(body.completed_dates)
  }

  /// `DELETE /api/habits/{id}/completions/{date}`
  pub async fn remove_completion(
    &self,
    id: Uuid,
    date: &str,
  ) -> Result<DateSet> {
    let resp = self
      .auth(
        self
          .client
          .delete(self.url(&format!("/habits/{id}/completions/{date}"))),
      )
      .send()
      .await
      .context("DELETE /habits/{id}/completions/{date} failed")?;

    if !resp.status().is_success() {
      return Err(
        api_error("DELETE /habits/{id}/completions/{date}", resp).await,
      );
    }
    let body: CompletionsBody =
      resp.json().await.context("deserialising completions")?;
    Ok(body.completed_dates)
  }

  /// `GET /api/habits/{id}/stats`
  pub async fn stats(&self, id: Uuid) -> Result<HabitStats> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/habits/{id}/stats"))))
      .send()
      .await
      .context("GET /habits/{id}/stats failed")?;

    if !resp.status().is_success() {
      return Err(api_error("GET /habits/{id}/stats", resp).await);
    }
    resp.json().await.context("deserialising stats")
  }
}
