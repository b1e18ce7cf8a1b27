// Play records: the immutable log entries the aggregator consumes.

use serde::{Deserialize, Serialize};

use crate::outcome::{Action, Outcome};
use crate::pev::{after_run_expectancy, pev, AfterState};
use crate::run_expectancy::run_expectancy;
use crate::situation::{Count, RunnerState, Situation};

/// What the operator enters after the play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayResult {
    pub action: Action,
    pub outcome: Outcome,
    pub runs_scored: u32,
    pub next_outs: u8,
    pub next_runners: RunnerState,
    pub next_count: Count,
    pub pitch_count: Option<u32>,
}

impl PlayResult {
    pub fn after_state(&self) -> AfterState {
        AfterState::new(self.next_outs, self.next_runners).with_count(self.next_count)
    }
}

/// One logged play. Created once at commit time and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecord {
    pub id: String,
    pub date: String,
    /// Fingerprint of `game_state`.
    pub state_id: String,
    pub game_state: Situation,
    pub action: Action,
    pub result_type: Outcome,
    pub runs_scored: u32,
    pub next_outs: u8,
    pub next_runners: RunnerState,
    #[serde(default)]
    pub next_balls: u8,
    #[serde(default)]
    pub next_strikes: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_count: Option<u32>,
    #[serde(rename = "currentRE")]
    pub current_re: f64,
    #[serde(rename = "nextRE")]
    pub next_re: f64,
    pub pev: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_team: Option<String>,
}

impl PlayRecord {
    /// Evaluate a play against the situation it started from.
    pub fn compute(
        id: impl Into<String>,
        date: impl Into<String>,
        before: &Situation,
        result: &PlayResult,
    ) -> Self {
        let current_re = run_expectancy(before.outs, before.runners, before.count);
        let after = result.after_state();
        let next_re = after_run_expectancy(after, result.outcome);
        let value = pev(result.runs_scored, current_re, after, result.outcome);

        tracing::trace!(
            state = %before.fingerprint(),
            outcome = result.outcome.key(),
            current_re,
            next_re,
            pev = value,
            "evaluated play"
        );

        PlayRecord {
            id: id.into(),
            date: date.into(),
            state_id: before.fingerprint(),
            game_state: before.clone(),
            action: result.action,
            result_type: result.outcome,
            runs_scored: result.runs_scored,
            next_outs: result.next_outs,
            next_runners: result.next_runners,
            next_balls: result.next_count.balls,
            next_strikes: result.next_count.strikes,
            pitch_count: result.pitch_count,
            current_re,
            next_re,
            pev: value,
            offense_team: before.offense_team.clone(),
            defense_team: before.defense_team.clone(),
        }
    }

    pub fn next_count(&self) -> Count {
        Count::new(self.next_balls, self.next_strikes)
    }

    /// Pitch count for averaging; unrecorded (or zero) counts as a single
    /// pitch.
    pub fn pitches_or_default(&self) -> u32 {
        match self.pitch_count {
            Some(n) if n > 0 => n,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
