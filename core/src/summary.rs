use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of one tile, created when the tile finalizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub tile: TileId,
    pub correct: bool,
    pub tries: u8,
    pub elapsed: Duration,
}

/// Results of a whole round, in the order the tiles finalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    records: Vec<TileRecord>,
}

impl GameSummary {
    pub fn new(records: Vec<TileRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    /// `(correct, elapsed)` per tile.
    pub fn results(&self) -> impl Iterator<Item = (bool, Duration)> + '_ {
        self.records.iter().map(|r| (r.correct, r.elapsed))
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn number_correct(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.records.iter().map(|r| r.elapsed).sum()
    }

    pub fn average_elapsed(&self) -> Duration {
        match u32::try_from(self.records.len()) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.total_elapsed() / count,
            Err(_) => {
                let nanos = self.total_elapsed().as_nanos() / self.records.len() as u128;
                Duration::from_nanos(nanos.try_into().unwrap_or(u64::MAX))
            }
        }
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Number correct: {} out of {}",
            self.number_correct(),
            self.total()
        )?;
        write!(f, "Average time: {}", format_elapsed(self.average_elapsed()))
    }
}

const NANOS_PER_HUNDREDTH: u128 = 10_000_000;

/// Formats as `MM:SS.ss`, rounded to the nearest hundredth.
pub fn format_elapsed(elapsed: Duration) -> String {
    let hundredths = (elapsed.as_nanos() + NANOS_PER_HUNDREDTH / 2) / NANOS_PER_HUNDREDTH;
    let minutes = hundredths / 6_000;
    let rest = hundredths % 6_000;
    alloc::format!("{:02}:{:02}.{:02}", minutes, rest / 100, rest % 100)
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    fn record(tile: TileId, correct: bool, millis: u64) -> TileRecord {
        TileRecord {
            tile,
            correct,
            tries: if correct { 1 } else { 3 },
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn formats_minutes_and_hundredths() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00.00");
        assert_eq!(format_elapsed(Duration::from_millis(4_250)), "00:04.25");
        assert_eq!(format_elapsed(Duration::from_millis(65_500)), "01:05.50");
        assert_eq!(format_elapsed(Duration::from_secs(754)), "12:34.00");
    }

    #[test]
    fn rounding_carries_into_minutes() {
        assert_eq!(format_elapsed(Duration::from_millis(59_996)), "01:00.00");
        assert_eq!(format_elapsed(Duration::from_millis(59_994)), "00:59.99");
        assert_eq!(format_elapsed(Duration::from_millis(1_005)), "00:01.01");
    }

    #[test]
    fn counts_correct_and_averages_time() {
        let summary = GameSummary::new(vec![
            record((0, 0), true, 2_000),
            record((1, 0), false, 6_000),
            record((0, 1), true, 1_000),
            record((1, 1), true, 3_000),
        ]);

        assert_eq!(summary.number_correct(), 3);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.average_elapsed(), Duration::from_millis(3_000));
        assert_eq!(
            summary.to_string(),
            "Number correct: 3 out of 4\nAverage time: 00:03.00"
        );
    }

    #[test]
    fn results_pair_correctness_with_time() {
        let summary = GameSummary::new(vec![record((1, 1), false, 900), record((0, 1), true, 450)]);

        let results: Vec<_> = summary.results().collect();

        assert_eq!(
            results,
            vec![
                (false, Duration::from_millis(900)),
                (true, Duration::from_millis(450))
            ]
        );
    }

    #[test]
    fn empty_summary_has_zero_average() {
        let summary = GameSummary::new(vec![]);

        assert_eq!(summary.average_elapsed(), Duration::ZERO);
        assert_eq!(summary.number_correct(), 0);
    }

    #[test]
    fn summary_serializes_records_in_order() {
        let summary = GameSummary::new(vec![record((1, 0), false, 10), record((0, 0), true, 20)]);

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["records"][0]["tile"], serde_json::json!([1, 0]));
        assert_eq!(json["records"][1]["correct"], serde_json::json!(true));
    }
}
