// Base-out run expectancy with ball-strike count adjustment.

use crate::situation::{Count, RunnerState};

/// Expected runs for the rest of the half inning, keyed by (outs, runners).
///
/// Approximated for NPB / independent league play. Three outs is handled
/// before lookup and always yields zero.
pub const BASE_RUN_EXPECTANCY: &[((u8, RunnerState), f64)] = &[
    ((0, RunnerState::Empty), 0.48),
    ((0, RunnerState::First), 0.85),
    ((0, RunnerState::Second), 1.07),
    ((0, RunnerState::Third), 1.30),
    ((0, RunnerState::FirstSecond), 1.46),
    ((0, RunnerState::FirstThird), 1.70),
    ((0, RunnerState::SecondThird), 1.90),
    ((0, RunnerState::Loaded), 2.25),
    ((1, RunnerState::Empty), 0.26),
    ((1, RunnerState::First), 0.51),
    ((1, RunnerState::Second), 0.67),
    ((1, RunnerState::Third), 0.90),
    ((1, RunnerState::FirstSecond), 0.90),
    ((1, RunnerState::FirstThird), 1.15),
    ((1, RunnerState::SecondThird), 1.35),
    ((1, RunnerState::Loaded), 1.54),
    ((2, RunnerState::Empty), 0.10),
    ((2, RunnerState::First), 0.22),
    ((2, RunnerState::Second), 0.32),
    ((2, RunnerState::Third), 0.36),
    ((2, RunnerState::FirstSecond), 0.44),
    ((2, RunnerState::FirstThird), 0.50),
    ((2, RunnerState::SecondThird), 0.58),
    ((2, RunnerState::Loaded), 0.75),
];

/// Signed run-expectancy shift by (balls, strikes). Positive favors the
/// batter.
pub const COUNT_ADJUSTMENTS: &[((u8, u8), f64)] = &[
    ((0, 0), 0.00),
    ((1, 0), 0.03),
    ((2, 0), 0.09),
    ((3, 0), 0.20),
    ((0, 1), -0.04),
    ((1, 1), -0.02),
    ((2, 1), 0.03),
    ((3, 1), 0.13),
    ((0, 2), -0.10),
    ((1, 2), -0.08),
    ((2, 2), -0.03),
    ((3, 2), 0.06),
];

/// Table value for (outs, runners) at 0-0; 0 for combinations not in the
/// table.
pub fn base_run_expectancy(outs: u8, runners: RunnerState) -> f64 {
    BASE_RUN_EXPECTANCY
        .iter()
        .find(|((o, r), _)| *o == outs && *r == runners)
        .map(|(_, re)| *re)
        .unwrap_or(0.0)
}

/// Count adjustment; 0 for counts not in the table.
pub fn count_adjustment(count: Count) -> f64 {
    COUNT_ADJUSTMENTS
        .iter()
        .find(|((b, s), _)| *b == count.balls && *s == count.strikes)
        .map(|(_, adj)| *adj)
        .unwrap_or(0.0)
}

/// Expected runs for the given outs, runners and count, never below zero.
/// Three or more outs always yields zero.
pub fn run_expectancy(outs: u8, runners: RunnerState, count: Count) -> f64 {
    if outs >= 3 {
        return 0.0;
    }
    (base_run_expectancy(outs, runners) + count_adjustment(count)).max(0.0)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
