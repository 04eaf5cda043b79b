use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, TimeZone};

use crate::balance::{Balance, Direction};
use crate::time_entry::TimeEntry;

/// Consoleに集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// 残業時間を表示する。
    fn show_balance(&mut self, balance: &Balance) -> Result<()>;

    /// タイムエントリーを表示する。
    ///
    /// # Arguments
    ///
    /// * `time_entries` - 表示するタイムエントリー
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()>;
}

/// 指定したタイムゾーンで結果を表示する。
pub struct Console<'a, W: Write> {
    writer: &'a mut W,
    timezone: FixedOffset,
}

impl<'a, W: Write> Console<'a, W> {
    /// 新しい`Console`を返す。
    pub fn new(writer: &'a mut W, timezone: FixedOffset) -> Self {
        Self { writer, timezone }
    }

    fn local<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) -> DateTime<FixedOffset> {
        datetime.with_timezone(&self.timezone)
    }
}

impl<'a, W: Write> ConsolePresenter for Console<'a, W> {
    // `balance = 13h, 30min left`のように表示する。1分未満の差は表示しない。
    fn show_balance(&mut self, balance: &Balance) -> Result<()> {
        let line = if balance.delta < Duration::minutes(1) {
            "balance = even".to_string()
        } else {
            match balance.direction {
                Direction::Owed => format!("balance = {} left", balance.formatted),
                Direction::Surplus => format!("balance = {} done extra", balance.formatted),
            }
        };
        writeln!(self.writer, "{}", line)
            .with_context(|| format!("Failed to write balance: {:?}", balance))
    }

    // time entryをMarkdownのlist形式で表示する。
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()> {
        let mut sorted_entries = time_entries.to_vec();
        sorted_entries.sort_by_key(|entry| entry.start);

        for entry in sorted_entries {
            let start_str = self.local(&entry.start).format("%H:%M").to_string();
            let end_str = entry
                .stop
                .map(|stop| self.local(&stop).format("%H:%M").to_string())
                .unwrap_or_else(|| "now".to_string());
            writeln!(
                self.writer,
                "- {} ~ {}: {}",
                start_str, end_str, entry.description
            )
            .with_context(|| format!("Failed to write time entry: {:?}", entry))?;
        }

        Ok(())
    }
}

/// ログ出力用にタイムエントリーを1行にまとめる。
///
/// `2018-02-05 10:00:13-12:00:32 General`の形式となる。
pub fn format_entry_log(entry: &TimeEntry, timezone: &FixedOffset) -> String {
    let start = entry.start.with_timezone(timezone);
    let stop = entry
        .stop
        .map(|stop| stop.with_timezone(timezone).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "now".to_string());
    format!(
        "{}-{} {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        stop,
        entry.description
    )
}
