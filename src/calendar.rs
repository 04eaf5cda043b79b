use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use serde::Deserialize;

use crate::error::{BalanceError, Result};
use crate::holidays::PublicHolidaySource;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 個人休暇・会社休日の1件分。`(日付, 日数)`の組で、日数は半休なら0.5となる。
pub type HolidayAllowance = (String, f64);

/// 土日と休日が重なった場合の数え方。
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// 土日と休日をそれぞれ独立に数える。土日の休日は二重に差し引かれる。
    #[default]
    CountIndependently,
    /// 土日に当たる休日は数えない。
    SkipWeekendHolidays,
}

impl OverlapPolicy {
    fn counts(&self, date: NaiveDate) -> bool {
        match self {
            OverlapPolicy::CountIndependently => true,
            OverlapPolicy::SkipWeekendHolidays => !is_weekend(date),
        }
    }
}

/// 期間中に勤務しなくてよい日数の内訳。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Exclusions {
    pub bank_holidays: usize,
    pub weekend_days: i64,
    pub personal_holidays: f64,
    pub company_holidays: f64,
}

impl Exclusions {
    /// 差し引く日数の合計。
    pub fn total_days(&self) -> f64 {
        self.bank_holidays as f64
            + self.weekend_days as f64
            + self.personal_holidays
            + self.company_holidays
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 日付の00:00:00が`[start, end]`に含まれるかどうかを、期間側のローカル時刻で判定する。
fn in_range<Tz: TimeZone>(date: NaiveDate, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    start.naive_local() <= midnight && midnight <= end.naive_local()
}

/// `start`から1日ずつ進め、`end`に達するまでの土日の日数を数える。
///
/// `start >= end`の場合は0を返す。
pub fn count_weekend_days<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
    let mut result = 0;
    let mut current = start.clone();
    while current < *end {
        if is_weekend(current.date_naive()) {
            result += 1;
        }
        current = current + Duration::days(1);
    }
    result
}

/// `[start, end]`に含まれる休日の日数を合計する。
///
/// 日付の形式が不正な場合は、期間外のものであってもエラーとする。
///
/// # Arguments
///
/// * `allowances` - `(YYYY-MM-DD, 日数)`のリスト
/// * `start` - 集計期間の開始日時
/// * `end` - 集計期間の終了日時
/// * `overlap` - 土日に当たる休日の扱い
pub fn sum_holiday_allowance<Tz: TimeZone>(
    allowances: &[HolidayAllowance],
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    overlap: OverlapPolicy,
) -> Result<f64> {
    let mut result = 0.0;
    for (day, amount) in allowances {
        let date = parse_date(day)?;
        if in_range(date, start, end) && overlap.counts(date) {
            result += amount;
        }
    }
    Ok(result)
}

/// 祝日カレンダーから`[start, end]`に含まれる祝日の数を数える。
pub async fn count_public_holidays<Tz: TimeZone, S: PublicHolidaySource>(
    source: &mut S,
    region: &str,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    overlap: OverlapPolicy,
) -> Result<usize> {
    let holidays: HashSet<NaiveDate> = source.holidays(region).await?;
    Ok(holidays
        .iter()
        .filter(|date| in_range(**date, start, end) && overlap.counts(**date))
        .count())
}

/// `YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|source| BalanceError::Parse {
        value: s.to_string(),
        source,
    })
}
