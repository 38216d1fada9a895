use chrono::{DateTime, Duration, FixedOffset};

/// Togglのtime entryを表す構造体。
///
/// 時刻はAPIから返されたオフセットのまま保持する。
#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub id: i64,
    pub guid: Option<String>,
    pub workspace_id: i64,
    pub project_id: Option<i64>,
    pub billable: bool,
    pub start: DateTime<FixedOffset>,
    pub stop: Option<DateTime<FixedOffset>>,
    /// APIが返す秒数。負の値は計測中を表す。
    pub duration: i64,
    pub description: String,
    pub duronly: bool,
    pub at: Option<DateTime<FixedOffset>>,
    pub user_id: i64,
}

impl TimeEntry {
    /// 計測中のtime entryかどうかを返す。
    pub fn is_running(&self) -> bool {
        self.duration < 0 || self.stop.is_none()
    }

    /// `stop - start`で計算した経過時間を返す。
    ///
    /// 計測中の場合は`None`を返す。`duration`フィールドよりもこちらを正とする。
    pub fn elapsed(&self) -> Option<Duration> {
        if self.is_running() {
            return None;
        }
        self.stop.map(|stop| stop - self.start)
    }
}
