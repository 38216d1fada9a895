use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Utc};
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use crate::time_entry::TimeEntry;

/// Toggl API v9のエンドポイント。
pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";

/// time entryを更新した際に`created_with`として送るクライアント名。
pub const CREATED_WITH: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Toggl APIのレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct TogglTimeEntry {
    id: i64,
    #[serde(default)]
    guid: Option<String>,
    workspace_id: i64,
    #[serde(default)]
    project_id: Option<i64>,
    #[serde(default)]
    billable: bool,
    start: DateTime<FixedOffset>,
    #[serde(default)]
    stop: Option<DateTime<FixedOffset>>,
    duration: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duronly: bool,
    #[serde(default)]
    at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    user_id: i64,
}

impl From<TogglTimeEntry> for TimeEntry {
    fn from(entry: TogglTimeEntry) -> Self {
        Self {
            id: entry.id,
            guid: entry.guid,
            workspace_id: entry.workspace_id,
            project_id: entry.project_id,
            billable: entry.billable,
            start: entry.start,
            stop: entry.stop,
            duration: entry.duration,
            description: entry.description.unwrap_or_default(),
            duronly: entry.duronly,
            at: entry.at,
            user_id: entry.user_id,
        }
    }
}

/// time entryの時間を更新するリクエストボディ。
#[derive(Debug, Serialize)]
struct UpdateTimeEntry<'a> {
    duration: i64,
    created_with: &'a str,
}

/// Togglとtime entryをやり取りするためのtrait。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TogglRepository {
    /// 指定された期間のタイムエントリーを取得する。
    ///
    /// # Arguments
    ///
    /// * `start_at` - 取得するタイムエントリーの開始日時
    /// * `end_at` - 取得するタイムエントリーの終了日時
    async fn read_time_entries(
        &self,
        start_at: &DateTime<Utc>,
        end_at: &DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>>;

    /// タイムエントリーの時間を`duration`で上書きする。
    async fn update_duration(&self, entry: &TimeEntry, duration: Duration) -> Result<()>;
}

/// Toggl APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = TogglClient::new("api token");
/// let time_entries = client.read_time_entries(&start_at, &end_at).await.unwrap();
/// ```
pub struct TogglClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl TogglClient {
    /// 新しい`TogglClient`を返す。
    pub fn new(api_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// 接続先のURLを変更する。
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TogglRepository for TogglClient {
    async fn read_time_entries(
        &self,
        start_at: &DateTime<Utc>,
        end_at: &DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>> {
        let toggl_time_entries = self
            .client
            .get(format!("{}/me/time_entries", self.api_url))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                (
                    "start_date",
                    start_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("end_date", end_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Toggl API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<TogglTimeEntry>>()
            .await
            .context("Failed to deserialize response")?;
        info!("length of time entries: {}", toggl_time_entries.len());

        Ok(toggl_time_entries.into_iter().map(TimeEntry::from).collect())
    }

    async fn update_duration(&self, entry: &TimeEntry, duration: Duration) -> Result<()> {
        let url = format!(
            "{}/workspaces/{}/time_entries/{}",
            self.api_url, entry.workspace_id, entry.id
        );
        debug!("PUT {} duration={}s", url, duration.num_seconds());

        self.client
            .put(&url)
            .basic_auth(&self.api_token, Some("api_token"))
            .json(&UpdateTimeEntry {
                duration: duration.num_seconds(),
                created_with: CREATED_WITH,
            })
            .send()
            .await
            .with_context(|| format!("Failed to send request to Toggl API at {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to update time entry {}", entry.id))?;

        Ok(())
    }
}
