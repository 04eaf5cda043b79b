use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

#[cfg(not(test))]
/// 現在のUTC時間を取得する。
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// テスト時に利用するモック時間を取得する。
#[cfg(test)]
pub mod mock_datetime {
    use std::cell::RefCell;

    use super::DateTime;
    use super::Utc;

    thread_local! {
        static MOCK_TIME: RefCell<Option<DateTime<Utc>>> = const { RefCell::new(None) };
    }

    /// モック時間を取得する。
    pub fn now() -> DateTime<Utc> {
        MOCK_TIME.with(|cell| cell.borrow().as_ref().cloned().unwrap_or_else(Utc::now))
    }

    /// モック時間を設定する。
    pub fn set_mock_time(time: DateTime<Utc>) {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = Some(time));
    }

    // 設定したモック時間をクリアする。
    pub fn clear_mock_time() {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
pub use mock_datetime::now;

/// コマンドライン引数の`YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

/// `+09:00`形式のオフセットをパースする。
///
/// 指定がない場合は、現在のローカルタイムゾーンのオフセットを返す。
pub fn parse_offset(s: Option<&str>) -> Result<FixedOffset> {
    match s {
        Some(s) => s
            .parse::<FixedOffset>()
            .with_context(|| format!("Failed to parse timezone: {}", s)),
        None => Ok(Local::now().offset().fix()),
    }
}

/// 指定したタイムゾーンでの日付の00:00:00を返す。
pub fn start_of_day(date: NaiveDate, tz: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .with_context(|| format!("Failed to convert {} to DateTime<FixedOffset>", date))
}

/// 指定したタイムゾーンでの日付の23:59:59を返す。
pub fn end_of_day(date: NaiveDate, tz: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).context("Failed to set time")?;
    tz.from_local_datetime(&date.and_time(last_second))
        .single()
        .with_context(|| format!("Failed to convert {} to DateTime<FixedOffset>", date))
}
