use thiserror::Error;

/// 残業時間の計算で発生するエラー。
#[derive(Debug, Error)]
pub enum BalanceError {
    /// 休日リストなどの日付文字列が`YYYY-MM-DD`形式でない。
    #[error("Failed to parse date: {value}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// 祝日カレンダーの取得に失敗した。
    #[error("Failed to retrieve public holidays: {0}")]
    HolidaySource(String),

    /// タイムゾーン情報のない日時を受け取った。
    #[error("Timestamp has no timezone: {0}")]
    MissingTimezone(String),
}

pub type Result<T, E = BalanceError> = std::result::Result<T, E>;
