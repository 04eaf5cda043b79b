use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset, NaiveDate};
use log::info;

use crate::balance::format_balance;
use crate::datetime;
use crate::time_entry::TimeEntry;
use crate::toggl::{ProjectCatalog, TogglRepository};
use crate::worked::sum_worked_duration;

/// 1日分のタイムエントリーを表示するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct EntriesArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = datetime::parse_date_arg),
    )]
    pub date: Option<NaiveDate>,
}

pub struct EntriesCommand<'a, T: TogglRepository> {
    toggl_client: &'a T,
    client_name: &'a str,
    timezone: FixedOffset,
}

impl<'a, T: TogglRepository> EntriesCommand<'a, T> {
    /// 新しい`EntriesCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    /// * `client_name` - 集計対象のクライアント名
    /// * `timezone` - 日付の区切りに使うタイムゾーン
    pub fn new(toggl_client: &'a T, client_name: &'a str, timezone: FixedOffset) -> Self {
        Self {
            toggl_client,
            client_name,
            timezone,
        }
    }

    /// `entries`サブコマンドの処理を行う。
    ///
    /// 指定されたタイムゾーンで日付の00:00:00から始まる1日の、クライアントのプロジェクトの
    /// タイムエントリーを取得する。日付が指定されていない場合は今日とする。
    pub async fn run(&self, args: EntriesArgs) -> Result<Vec<TimeEntry>> {
        let date = args
            .date
            .unwrap_or_else(|| datetime::now().with_timezone(&self.timezone).date_naive());
        let start_at = datetime::start_of_day(date, &self.timezone)?;
        let end_at = start_at + Duration::days(1);
        info!("Start at: {}, End at: {}", start_at, end_at);

        let work_projects = ProjectCatalog::new(self.toggl_client)
            .work_project_ids(self.client_name)
            .await?;
        let time_entries = self
            .toggl_client
            .read_time_entries(&start_at.to_utc(), &end_at.to_utc())
            .await
            .context("Failed to retrieve time entries")?;

        info!("Time entries retrieved successfully.");

        let work_entries: Vec<TimeEntry> = time_entries
            .into_iter()
            .filter(|entry| {
                entry
                    .project_id
                    .is_some_and(|id| work_projects.contains(&id))
            })
            .collect();
        info!(
            "Worked on {}: {}",
            date,
            format_balance(sum_worked_duration(&work_entries, datetime::now()))
        );

        Ok(work_entries)
    }
}
