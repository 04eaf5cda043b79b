use chrono::{DateTime, Duration, TimeZone};

use crate::calendar::Exclusions;

/// `start`から`now`までに働くべき時間を計算する。
///
/// 経過日数から休日を差し引いた日数に、開始日の分の1日を足して1日の勤務時間を掛ける。
/// 休日の方が多い場合や開始日が未来の場合は負の時間を返す。
///
/// # Arguments
///
/// * `start` - 勤務開始日時
/// * `now` - 集計する時点
/// * `exclusions` - 期間中の休日の内訳
/// * `working_day_hours` - 1日の勤務時間
pub fn compute_hours_owed<Tz: TimeZone>(
    start: &DateTime<Tz>,
    now: &DateTime<Tz>,
    exclusions: &Exclusions,
    working_day_hours: f64,
) -> Duration {
    let elapsed_days = (now.date_naive() - start.date_naive()).num_days();
    let days_to_work = elapsed_days as f64 - exclusions.total_days();
    let hours_owed = (days_to_work + 1.0) * working_day_hours;

    Duration::milliseconds((hours_owed * 3_600_000.0).round() as i64)
}
