use chrono::Duration;
use log::debug;

use crate::time_entry::TimeEntry;

/// 丸め対象となったtime entryと丸め前後の時間。
#[derive(Clone, Debug, PartialEq)]
pub struct Rounding {
    pub entry: TimeEntry,
    pub old_duration: Duration,
    pub new_duration: Duration,
}

/// `duration`を`granularity`の倍数に切り上げる。
///
/// 四捨五入した結果が元の値より小さくなった場合は`granularity`を1つ加えるため、
/// 結果は常に`duration`以上になる。`granularity`が0以下の場合は何もしない。
pub fn round_up(duration: Duration, granularity: Duration) -> Duration {
    let unit = granularity.num_milliseconds();
    if unit <= 0 {
        return duration;
    }

    let value = duration.num_milliseconds();
    let remainder = value.rem_euclid(unit);
    let mut rounded = value - remainder;
    if remainder * 2 >= unit {
        rounded += unit;
    }
    if rounded < value {
        rounded += unit;
    }

    Duration::milliseconds(rounded)
}

/// 丸めが必要なtime entryを入力順に抽出する。
///
/// 計測中のもの、長さが0のもの、丸めても変わらないものは対象外とする。
pub fn plan_rounding(time_entries: &[TimeEntry], granularity: Duration) -> Vec<Rounding> {
    time_entries
        .iter()
        .filter_map(|entry| {
            let old_duration = entry.elapsed()?;
            if old_duration.num_seconds() != entry.duration {
                debug!(
                    "Reported duration of entry {} ({}s) differs from stop - start ({}s)",
                    entry.id,
                    entry.duration,
                    old_duration.num_seconds()
                );
            }

            let new_duration = round_up(old_duration, granularity);
            if old_duration.is_zero() || new_duration == old_duration {
                return None;
            }

            Some(Rounding {
                entry: entry.clone(),
                old_duration,
                new_duration,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::{plan_rounding, round_up};
    use crate::time_entry::fixtures::{finished_entry, running_entry};
    use crate::time_entry::TimeEntry;

    #[rstest]
    #[case::lower_half(Duration::minutes(47), Duration::minutes(5), Duration::minutes(50))]
    #[case::upper_half(Duration::minutes(41), Duration::minutes(5), Duration::minutes(45))]
    #[case::exact(Duration::minutes(40), Duration::minutes(5), Duration::minutes(40))]
    #[case::midpoint(Duration::seconds(150), Duration::minutes(5), Duration::minutes(5))]
    #[case::one_second(Duration::seconds(1), Duration::minutes(5), Duration::minutes(5))]
    #[case::zero(Duration::zero(), Duration::minutes(5), Duration::zero())]
    #[case::quarter_hour(Duration::minutes(61), Duration::minutes(15), Duration::minutes(75))]
    #[case::no_granularity(Duration::minutes(47), Duration::zero(), Duration::minutes(47))]
    fn test_round_up(
        #[case] duration: Duration,
        #[case] granularity: Duration,
        #[case] expected: Duration,
    ) {
        assert_eq!(round_up(duration, granularity), expected);
    }

    /// 結果がgranularityの倍数かつ入力以上で、冪等であることを確認する。
    #[rstest]
    #[case(Duration::seconds(30))]
    #[case(Duration::minutes(5))]
    #[case(Duration::minutes(15))]
    #[case(Duration::hours(1))]
    fn test_round_up_properties(#[case] granularity: Duration) {
        for seconds in (0..=4 * 3600).step_by(7) {
            let duration = Duration::seconds(seconds);
            let rounded = round_up(duration, granularity);

            assert_eq!(rounded.num_milliseconds() % granularity.num_milliseconds(), 0);
            assert!(rounded >= duration);
            assert!(rounded >= Duration::zero());
            assert_eq!(round_up(rounded, granularity), rounded);
            if seconds * 1000 % granularity.num_milliseconds() == 0 {
                assert_eq!(rounded, duration);
            }
        }
    }

    #[test]
    fn test_plan_rounding_rounds_up() {
        let entries = [finished_entry(
            1,
            "2024-01-01T09:00:00+00:00",
            "2024-01-01T09:47:00+00:00",
        )];

        let plan = plan_rounding(&entries, Duration::minutes(5));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].entry.id, 1);
        assert_eq!(plan[0].old_duration, Duration::minutes(47));
        assert_eq!(plan[0].new_duration, Duration::minutes(50));
        assert_eq!(plan[0].new_duration.num_seconds(), 3000);
    }

    #[rstest]
    #[case::unchanged(finished_entry(1, "2024-01-01T09:00:00+00:00", "2024-01-01T09:40:00+00:00"))]
    #[case::zero_length(finished_entry(1, "2024-01-01T09:00:00+00:00", "2024-01-01T09:00:00+00:00"))]
    #[case::running(running_entry(1, "2024-01-01T09:03:00+00:00"))]
    #[case::negative_duration({
        let mut entry = finished_entry(1, "2024-01-01T09:00:00+00:00", "2024-01-01T09:47:00+00:00");
        entry.duration = -1704099600;
        entry
    })]
    fn test_plan_rounding_skips(#[case] entry: TimeEntry) {
        assert!(plan_rounding(&[entry], Duration::minutes(5)).is_empty());
    }

    #[test]
    fn test_plan_rounding_keeps_input_order() {
        let entries = [
            finished_entry(3, "2024-01-02T09:00:00+00:00", "2024-01-02T09:01:00+00:00"),
            finished_entry(1, "2024-01-01T09:00:00+00:00", "2024-01-01T09:40:00+00:00"),
            finished_entry(2, "2024-01-01T10:00:00+00:00", "2024-01-01T10:12:00+00:00"),
        ];

        let ids: Vec<i64> = plan_rounding(&entries, Duration::minutes(5))
            .iter()
            .map(|rounding| rounding.entry.id)
            .collect();

        assert_eq!(ids, vec![3, 2]);
    }

    /// 報告された`duration`ではなく`stop - start`を丸める。
    #[test]
    fn test_plan_rounding_uses_stop_minus_start() {
        let mut entry =
            finished_entry(1, "2024-01-01T09:00:00+00:00", "2024-01-01T09:40:00+00:00");
        entry.duration = 47 * 60;

        assert!(plan_rounding(&[entry], Duration::minutes(5)).is_empty());
    }
}
