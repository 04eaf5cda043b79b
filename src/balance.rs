use chrono::Duration;

/// 残業時間の向き。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// 働くべき時間が残っている。
    Owed,
    /// 働くべき時間以上に働いている。
    Surplus,
}

/// 働くべき時間と働いた時間の差。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub direction: Direction,
    pub delta: Duration,
    pub formatted: String,
}

/// 時間を`1d, 2h, 30min`の形式に整形する。
///
/// 0となる単位と1分未満は出力しない。差がない場合は空文字列を返す。
pub fn format_balance(delta: Duration) -> String {
    let total_minutes = delta.num_seconds().abs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = total_minutes / 60 % 24;
    let minutes = total_minutes % 60;

    [(days, "d"), (hours, "h"), (minutes, "min")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 働くべき時間と働いた時間を比較する。
pub fn report_balance(owed: Duration, worked: Duration) -> Balance {
    let (direction, delta) = if owed > worked {
        (Direction::Owed, owed - worked)
    } else {
        (Direction::Surplus, worked - owed)
    };

    Balance {
        direction,
        delta,
        formatted: format_balance(delta),
    }
}
