use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

/// 現在のUTC時間。
#[cfg(not(test))]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}


#[cfg(test)]
pub use mock_datetime::now;

/// 現在時刻から`timeframe`だけ遡った期間を返す。
///
/// 戻り値は`(開始日時, 終了日時)`で、終了日時は現在時刻。
pub fn lookback(timeframe: Duration) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end_at = now();
    let start_at = end_at
        .checked_sub_signed(timeframe)
        .with_context(|| format!("Timeframe is out of range: {}", timeframe))?;

    Ok((start_at, end_at))
}
