use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use crate::time_entry::{EntryState, TimeEntry};

/// タイムエントリーを1件ずつ受け取り、働いた時間を積算する。
///
/// 計測中のエントリーは`now`までの経過時間を働いた時間とする。
pub struct WorkedTime {
    now: DateTime<Utc>,
    total: Duration,
    entries: usize,
}

impl WorkedTime {
    /// 新しい`WorkedTime`を返す。
    ///
    /// # Arguments
    ///
    /// * `now` - 計測中のエントリーの経過時間を計算する基準日時
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            total: Duration::zero(),
            entries: 0,
        }
    }

    /// エントリーを1件積算する。
    pub fn add(&mut self, entry: &TimeEntry) {
        let duration = match &entry.state {
            EntryState::Completed(duration) => *duration,
            EntryState::InProgress(start) => {
                let elapsed = self.now - *start;
                if elapsed < Duration::zero() {
                    warn!("Running entry starts after {}: {:?}", self.now, entry);
                    Duration::zero()
                } else {
                    debug!("Running entry counted as {}s", elapsed.num_seconds());
                    elapsed
                }
            }
        };
        self.total = self.total + duration;
        self.entries += 1;
    }

    /// 積算した時間。
    pub fn total(&self) -> Duration {
        self.total
    }

    /// 積算したエントリーの件数。
    pub fn len(&self) -> usize {
        self.entries
    }
}

impl<'a> Extend<&'a TimeEntry> for WorkedTime {
    fn extend<I: IntoIterator<Item = &'a TimeEntry>>(&mut self, iter: I) {
        iter.into_iter().for_each(|entry| self.add(entry));
    }
}

/// タイムエントリーの働いた時間を合計する。
pub fn sum_worked_duration<'a, I>(entries: I, now: DateTime<Utc>) -> Duration
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let mut worked = WorkedTime::new(now);
    worked.extend(entries);
    worked.total()
}
