// Player Evaluation Value: runs scored plus run-expectancy delta plus a fixed
// strategic adjustment for the outcome.

use crate::outcome::{Outcome, PlatePhase};
use crate::run_expectancy::run_expectancy;
use crate::situation::{Count, RunnerState};

/// Base-out-count state reported after the play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterState {
    /// 0-2, or 3 when the play ended the half inning.
    pub outs: u8,
    pub runners: RunnerState,
    /// Only consulted for pitch events; ignored once the appearance ends.
    pub count: Count,
}

impl AfterState {
    pub fn new(outs: u8, runners: RunnerState) -> Self {
        Self {
            outs,
            runners,
            count: Count::FRESH,
        }
    }

    pub fn with_count(mut self, count: Count) -> Self {
        self.count = count;
        self
    }
}

/// Run expectancy of the state after the play.
///
/// A finished plate appearance hands a fresh 0-0 count to the next batter,
/// so the supplied count only matters for continuing pitch events.
pub fn after_run_expectancy(after: AfterState, outcome: Outcome) -> f64 {
    if after.outs >= 3 {
        return 0.0;
    }
    let count = match outcome.phase() {
        PlatePhase::Continuing => after.count,
        PlatePhase::Ending => Count::FRESH,
    };
    run_expectancy(after.outs, after.runners, count)
}

/// `runs + (after RE - before RE) + risk adjustment`.
pub fn pev(runs_scored: u32, before_re: f64, after: AfterState, outcome: Outcome) -> f64 {
    let after_re = after_run_expectancy(after, outcome);
    f64::from(runs_scored) + (after_re - before_re) + outcome.risk_adjustment()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn ball_taken_with_runner_on_first() {
        let after = AfterState::new(0, RunnerState::First).with_count(Count::new(1, 0));
        let value = pev(0, 0.85, after, Outcome::BallTaken);
        assert!((value - 0.03).abs() < EPS, "got {value}");
    }

    #[test]
    fn double_play_costs_delta_plus_penalty() {
        let after = AfterState::new(2, RunnerState::Empty);
        let value = pev(0, 0.48, after, Outcome::DoublePlay);
        assert!((value - (0.10 - 0.48 - 0.50)).abs() < EPS, "got {value}");
    }

    #[test]
    fn linear_in_runs_scored() {
        let after = AfterState::new(1, RunnerState::Third).with_count(Count::new(2, 2));
        for outcome in Outcome::ALL {
            for runs in 0..4 {
                let lo = pev(runs, 1.07, after, outcome);
                let hi = pev(runs + 1, 1.07, after, outcome);
                assert!((hi - lo - 1.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn ending_outcomes_ignore_after_count() {
        for outcome in Outcome::ALL.iter().filter(|o| o.ends_appearance()) {
            let fresh = pev(0, 0.5, AfterState::new(1, RunnerState::First), *outcome);
            let late = pev(
                0,
                0.5,
                AfterState::new(1, RunnerState::First).with_count(Count::new(3, 2)),
                *outcome,
            );
            assert_eq!(fresh, late, "{outcome:?}");
        }
    }

    #[test]
    fn continuing_outcomes_use_after_count() {
        let fresh = pev(0, 0.5, AfterState::new(0, RunnerState::Empty), Outcome::StrikeTaken);
        let behind = pev(
            0,
            0.5,
            AfterState::new(0, RunnerState::Empty).with_count(Count::new(0, 2)),
            Outcome::StrikeTaken,
        );
        assert!((fresh - behind - 0.10).abs() < EPS);
    }

    #[test]
    fn inning_ending_play_zeroes_after_re() {
        let after = AfterState::new(3, RunnerState::Loaded).with_count(Count::new(3, 0));
        assert_eq!(after_run_expectancy(after, Outcome::FlyOut), 0.0);
        let value = pev(0, 0.75, after, Outcome::StrikeoutLooking);
        assert!((value - (-0.75 - 0.25)).abs() < EPS);
    }

    #[test]
    fn error_earns_bonus() {
        let after = AfterState::new(0, RunnerState::First);
        let value = pev(0, 0.48, after, Outcome::Error);
        assert!((value - (0.85 - 0.48 + 0.30)).abs() < EPS);
    }
}
