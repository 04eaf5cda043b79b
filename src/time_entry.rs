use chrono::{DateTime, Duration, Utc};

/// タイムエントリーの計測状態。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// 計測が終了しており、記録された長さを持つ。
    Completed(Duration),
    /// 計測中。開始日時のみ分かっている。
    InProgress(DateTime<Utc>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeEntry {
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
    pub state: EntryState,
    pub project_id: Option<i64>,
    pub description: String,
}

impl TimeEntry {
    /// 終了済みのタイムエントリーを返す。
    pub fn completed(
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        duration: Duration,
        project_id: Option<i64>,
        description: &str,
    ) -> Self {
        Self {
            start,
            stop: Some(stop),
            state: EntryState::Completed(duration),
            project_id,
            description: description.to_string(),
        }
    }

    /// 計測中のタイムエントリーを返す。
    pub fn in_progress(start: DateTime<Utc>, project_id: Option<i64>, description: &str) -> Self {
        Self {
            start,
            stop: None,
            state: EntryState::InProgress(start),
            project_id,
            description: description.to_string(),
        }
    }
}
