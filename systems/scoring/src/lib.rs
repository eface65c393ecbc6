#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring system that grades finished levels against their par time.

use std::time::Duration;

use sokoban_core::{Event, LevelId, ScoreReport};
use tracing::debug;

/// Highest score a level can award.
pub const MAX_SCORE: u32 = 100;

/// Multiple of the par time at which the score reaches zero.
const ZERO_SCORE_FACTOR: f64 = 10.0;
const ZERO_SCORE_MULTIPLE: u128 = 10;

/// Grades an elapsed time in seconds against a par time.
///
/// Finishing within par awards [`MAX_SCORE`]; taking ten times par or longer
/// awards zero. Between the two the score falls linearly. A par time of zero
/// always yields zero because every elapsed time is at least ten times par.
#[must_use]
pub fn compute_score(elapsed: f64, par_time: u32) -> f64 {
    let par = f64::from(par_time);
    if elapsed >= par * ZERO_SCORE_FACTOR {
        return 0.0;
    }
    if elapsed <= par {
        return f64::from(MAX_SCORE);
    }

    let span = par * (ZERO_SCORE_FACTOR - 1.0);
    f64::from(MAX_SCORE) * (1.0 - (elapsed - par) / span)
}

/// Truncated score of [`compute_score`], computed in whole nanoseconds so
/// exact breakpoints such as 82 s against a 10 s par land on whole points.
#[must_use]
pub fn truncated_score(elapsed: Duration, par_time: u32) -> u32 {
    let elapsed = elapsed.as_nanos();
    let par = Duration::from_secs(u64::from(par_time)).as_nanos();
    let zero_at = par * ZERO_SCORE_MULTIPLE;
    if elapsed >= zero_at {
        return 0;
    }
    if elapsed <= par {
        return MAX_SCORE;
    }

    let points = u128::from(MAX_SCORE) * (zero_at - elapsed) / (zero_at - par);
    u32::try_from(points).map_or(MAX_SCORE, |points| points.min(MAX_SCORE))
}

/// Grades a finished run and compares the truncated score with the previous best.
#[must_use]
pub fn grade(level: LevelId, elapsed: Duration, par_time: u32, previous_best: u32) -> ScoreReport {
    let score = truncated_score(elapsed, par_time);
    ScoreReport {
        level,
        score,
        previous_best,
        is_high_score: score > previous_best,
    }
}

/// Pure system that turns `LevelFinished` events into score reports.
#[derive(Debug, Default)]
pub struct Scoring {
    last_report: Option<ScoreReport>,
}

impl Scoring {
    /// Creates a new scoring system with no reports recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent report produced by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&ScoreReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and emits one report per finished level.
    ///
    /// The `previous_best` closure supplies the best score already recorded for
    /// a level so the report can flag new personal bests.
    pub fn handle<F>(&mut self, events: &[Event], mut previous_best: F, out: &mut Vec<ScoreReport>)
    where
        F: FnMut(LevelId) -> u32,
    {
        for event in events {
            if let Event::LevelFinished {
                level,
                elapsed,
                par_time,
            } = event
            {
                let report = grade(*level, *elapsed, *par_time, previous_best(*level));
                debug!(
                    level = level.get(),
                    score = report.score,
                    previous_best = report.previous_best,
                    high_score = report.is_high_score,
                    "level_scored"
                );
                self.last_report = Some(report);
                out.push(report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_par_time_never_scores() {
        assert_eq!(compute_score(0.0, 0), 0.0);
        assert_eq!(compute_score(3.5, 0), 0.0);
    }

    #[test]
    fn grade_truncates_before_comparing() {
        // 100 * (1 - 5.5 / 90) = 93.88..., truncated to 93.
        let report = grade(LevelId::new(0), Duration::from_millis(15_500), 10, 93);
        assert_eq!(report.score, 93);
        assert!(!report.is_high_score, "equal scores are not a new best");
    }

    #[test]
    fn whole_second_breakpoints_land_on_whole_points() {
        assert_eq!(truncated_score(Duration::from_secs(82), 10), 20);
        assert_eq!(truncated_score(Duration::from_secs(91), 10), 10);
        assert_eq!(truncated_score(Duration::from_millis(55_000), 10), 50);
        assert_eq!(truncated_score(Duration::from_secs(10), 10), 100);
        assert_eq!(truncated_score(Duration::from_secs(100), 10), 0);
        assert_eq!(truncated_score(Duration::from_secs(1), 0), 0);
    }

    #[test]
    fn grade_uses_exact_points_for_the_high_score_flag() {
        let report = grade(LevelId::new(0), Duration::from_secs(82), 10, 19);
        assert_eq!(report.score, 20);
        assert!(report.is_high_score);
    }
}
