use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::BalanceError;
use crate::time_entry::TimeEntry;

/// Toggl APIのレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct TogglTimeEntry {
    description: Option<String>,
    project_id: Option<i64>,
    start: String,
    stop: Option<String>,
    duration: i64,
}

/// Toggl APIのプロジェクト情報。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(alias = "cid")]
    pub client_id: Option<i64>,
}

/// Toggl APIのクライアント(取引先)情報。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: i64,
    pub name: String,
}

/// Toggl APIから情報を取得するためのtrait。
#[cfg_attr(test, automock)]
pub trait TogglRepository {
    /// `[start_at, end_at)`に開始したタイムエントリーを取得する。
    async fn read_time_entries(
        &self,
        start_at: &DateTime<Utc>,
        end_at: &DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>>;

    /// プロジェクト情報を取得する。
    async fn read_projects(&self) -> Result<Vec<Project>>;

    /// クライアント情報を取得する。
    async fn read_clients(&self) -> Result<Vec<ClientInfo>>;
}

/// Toggl APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = TogglClient::new(&token);
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
        Self::with_api_url(api_token, "https://api.track.toggl.com/api/v9")
    }

    /// 接続先のURLを指定して`TogglClient`を返す。
    pub fn with_api_url(api_token: &str, api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// `section`にGETリクエストを送り、レスポンスをデシリアライズする。
    async fn get<T: DeserializeOwned>(&self, section: &str, query: &[(&str, String)]) -> Result<T> {
        self.client
            .get(format!("{}/{}", self.api_url, section))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Toggl API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<T>()
            .await
            .context("Failed to deserialize response")
    }
}

impl TogglRepository for TogglClient {
    async fn read_time_entries(
        &self,
        start_at: &DateTime<Utc>,
        end_at: &DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>> {
        let toggl_time_entries: Vec<TogglTimeEntry> = self
            .get(
                "me/time_entries",
                &[
                    ("start_date", start_at.to_rfc3339()),
                    ("end_date", end_at.to_rfc3339()),
                ],
            )
            .await?;
        info!("length of time entries: {}", toggl_time_entries.len());

        toggl_time_entries
            .into_iter()
            .map(|entry| convert_time_entry(entry).map_err(anyhow::Error::from))
            .collect()
    }

    async fn read_projects(&self) -> Result<Vec<Project>> {
        self.get("me/projects", &[]).await
    }

    async fn read_clients(&self) -> Result<Vec<ClientInfo>> {
        self.get("me/clients", &[]).await
    }
}

/// Toggl APIのタイムエントリーを変換する。
///
/// 計測中のエントリーは`duration`が負の値となっている。
fn convert_time_entry(entry: TogglTimeEntry) -> Result<TimeEntry, BalanceError> {
    let start = parse_timestamp(&entry.start)?;
    let description = entry.description.unwrap_or_default();

    if entry.duration < 0 {
        return Ok(TimeEntry::in_progress(
            start,
            entry.project_id,
            &description,
        ));
    }

    let duration = Duration::seconds(entry.duration);
    let stop = match entry.stop {
        Some(stop) => parse_timestamp(&stop)?,
        None => start + duration,
    };
    Ok(TimeEntry::completed(
        start,
        stop,
        duration,
        entry.project_id,
        &description,
    ))
}

/// Toggl APIの日時をパースする。
///
/// タイムゾーンが付いていない日時は推測せずにエラーとする。
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, BalanceError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(datetime) => Ok(datetime.to_utc()),
        Err(source) => {
            if NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok() {
                Err(BalanceError::MissingTimezone(s.to_string()))
            } else {
                Err(BalanceError::Parse {
                    value: s.to_string(),
                    source,
                })
            }
        }
    }
}

/// クライアントとプロジェクトの一覧を1度だけ取得して保持する。
pub struct ProjectCatalog<'a, T: TogglRepository> {
    toggl_client: &'a T,
    clients: Option<Vec<ClientInfo>>,
    projects: Option<Vec<Project>>,
}

impl<'a, T: TogglRepository> ProjectCatalog<'a, T> {
    /// 新しい`ProjectCatalog`を返す。まだ何も取得しない。
    pub fn new(toggl_client: &'a T) -> Self {
        Self {
            toggl_client,
            clients: None,
            projects: None,
        }
    }

    /// クライアントの一覧。初回のみAPIから取得する。
    pub async fn clients(&mut self) -> Result<&[ClientInfo]> {
        if self.clients.is_none() {
            debug!("Fetching clients");
            let clients = self
                .toggl_client
                .read_clients()
                .await
                .context("Failed to get client list from toggl")?;
            self.clients = Some(clients);
        }
        Ok(self.clients.as_deref().unwrap_or_default())
    }

    /// プロジェクトの一覧。初回のみAPIから取得する。
    pub async fn projects(&mut self) -> Result<&[Project]> {
        if self.projects.is_none() {
            debug!("Fetching projects");
            let projects = self
                .toggl_client
                .read_projects()
                .await
                .context("Failed to get project list from toggl")?;
            self.projects = Some(projects);
        }
        Ok(self.projects.as_deref().unwrap_or_default())
    }

    /// 指定したクライアントに属するプロジェクトのIDを返す。
    ///
    /// クライアントが存在しない場合はエラーとする。
    pub async fn work_project_ids(&mut self, client_name: &str) -> Result<HashSet<i64>> {
        let client_id = self
            .clients()
            .await?
            .iter()
            .find(|client| client.name == client_name)
            .map(|client| client.id)
            .with_context(|| format!("Client {} not found in toggl", client_name))?;

        let project_ids = self
            .projects()
            .await?
            .iter()
            .filter(|project| project.client_id == Some(client_id))
            .map(|project| {
                debug!("Work project: {} ({})", project.name, project.id);
                project.id
            })
            .collect();

        Ok(project_ids)
    }
}
