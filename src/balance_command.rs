use std::cmp::min;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use log::{debug, info};

use crate::balance::{report_balance, Balance};
use crate::calendar::{count_public_holidays, count_weekend_days, sum_holiday_allowance, Exclusions};
use crate::config::Config;
use crate::console::format_entry_log;
use crate::datetime;
use crate::holidays::PublicHolidaySource;
use crate::obligation::compute_hours_owed;
use crate::toggl::{ProjectCatalog, TogglRepository};
use crate::worked::WorkedTime;

/// タイムエントリーを1度に取得する期間の日数。
const FETCH_WINDOW_DAYS: i64 = 30;

/// `balance`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct BalanceArgs {
    #[clap(
        short = 'e',
        long = "end",
        help = "Calculates the balance until the end of a date in the format YYYY-MM-DD",
        parse(try_from_str = datetime::parse_date_arg),
    )]
    pub end: Option<NaiveDate>,
}

/// 集計結果。
#[derive(Debug)]
pub struct BalanceReport {
    pub start: DateTime<FixedOffset>,
    pub now: DateTime<FixedOffset>,
    pub exclusions: Exclusions,
    pub owed: Duration,
    pub worked: Duration,
    pub balance: Balance,
}

pub struct BalanceCommand<'a, T: TogglRepository, H: PublicHolidaySource> {
    toggl_client: &'a T,
    holiday_source: H,
    config: &'a Config,
}

impl<'a, T: TogglRepository, H: PublicHolidaySource> BalanceCommand<'a, T, H> {
    /// 新しい`BalanceCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    /// * `holiday_source` - 祝日カレンダー
    /// * `config` - 設定ファイルの内容
    pub fn new(toggl_client: &'a T, holiday_source: H, config: &'a Config) -> Self {
        Self {
            toggl_client,
            holiday_source,
            config,
        }
    }

    /// `balance`サブコマンドの処理を行う。
    ///
    /// 設定された開始日の00:00:00から現在(`--end`指定時はその日の23:59:59)までに
    /// 働くべき時間と、クライアントのプロジェクトで働いた時間を比較する。
    pub async fn run(&mut self, args: BalanceArgs) -> Result<BalanceReport> {
        let config = self.config;
        let timezone = datetime::parse_offset(config.timezone.as_deref())?;
        let start = datetime::start_of_day(config.start_date()?, &timezone)?;
        let now = match args.end {
            Some(end) => datetime::end_of_day(end, &timezone)?,
            None => datetime::now().with_timezone(&timezone),
        };
        info!("Start at: {}, End at: {}", start, now);

        let worked = self
            .sum_worked(&start, &now, &timezone)
            .await
            .context("Failed to sum worked time")?;

        let overlap = config.holiday_overlap;
        let exclusions = Exclusions {
            bank_holidays: count_public_holidays(
                &mut self.holiday_source,
                &config.bank_holiday_region,
                &start,
                &now,
                overlap,
            )
            .await
            .context("Failed to count bank holidays")?,
            weekend_days: count_weekend_days(&start, &now),
            personal_holidays: sum_holiday_allowance(
                &config.personal_holidays,
                &start,
                &now,
                overlap,
            )
            .context("Invalid personal_holidays")?,
            company_holidays: sum_holiday_allowance(
                &config.company_bonus_days,
                &start,
                &now,
                overlap,
            )
            .context("Invalid company_bonus_days")?,
        };
        info!("{:?}", exclusions);

        let owed = compute_hours_owed(&start, &now, &exclusions, config.working_day_hours);
        info!(
            "Owed: {}s, Worked: {}s",
            owed.num_seconds(),
            worked.num_seconds()
        );

        Ok(BalanceReport {
            start,
            now,
            exclusions,
            owed,
            worked,
            balance: report_balance(owed, worked),
        })
    }

    /// クライアントのプロジェクトで働いた時間を、期間を区切りながら取得して積算する。
    async fn sum_worked(
        &self,
        start: &DateTime<FixedOffset>,
        now: &DateTime<FixedOffset>,
        timezone: &FixedOffset,
    ) -> Result<Duration> {
        let mut catalog = ProjectCatalog::new(self.toggl_client);
        let work_projects = catalog.work_project_ids(&self.config.client.name).await?;
        debug!("Work projects: {:?}", work_projects);

        let end_at = now.to_utc();
        let mut worked = WorkedTime::new(end_at);
        let mut window_start = start.to_utc();
        while window_start < end_at {
            let window_end = min(window_start + Duration::days(FETCH_WINDOW_DAYS), end_at);
            let time_entries = self
                .toggl_client
                .read_time_entries(&window_start, &window_end)
                .await
                .with_context(|| {
                    format!(
                        "Failed to retrieve time entries from {} to {}",
                        window_start, window_end
                    )
                })?;
            debug!("  >> {} - {}", window_start, window_end);

            time_entries
                .iter()
                .filter(|entry| {
                    entry
                        .project_id
                        .is_some_and(|id| work_projects.contains(&id))
                })
                .for_each(|entry| {
                    debug!("{}", format_entry_log(entry, timezone));
                    worked.add(entry);
                });
            window_start = window_end;
        }
        info!("Work entries counted: {}", worked.len());

        Ok(worked.total())
    }
}
