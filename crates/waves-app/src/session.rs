// The in-progress game: the situation the next play starts from, plus the
// matchup used to stamp offense/defense teams onto it.
//
// Persisted as JSON between CLI invocations so the operator can enter one
// play per command.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use waves_core::{Count, Half, PlayRecord, PlayResult, RunnerState, ScoreDiff, Situation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("inning must be at least 1")]
    InvalidInning,

    #[error("outs before a play must be 0, 1 or 2 (got {0})")]
    InvalidOuts(u8),

    #[error("outs after a play must be between 0 and 3 (got {0})")]
    InvalidNextOuts(u8),

    #[error("invalid count {balls}-{strikes}: balls must be 0-3 and strikes 0-2")]
    InvalidCount { balls: u8, strikes: u8 },

    #[error("base must be 1, 2 or 3 (got {0})")]
    InvalidBase(u8),
}

// ---------------------------------------------------------------------------
// Matchup
// ---------------------------------------------------------------------------

/// Which team bats in which half. Either side may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub home: Option<String>,
    pub visitor: Option<String>,
}

impl Matchup {
    /// Build the matchup from our team's name and side plus the opponent.
    pub fn new(team: &str, team_is_home: bool, opponent: Option<String>) -> Self {
        let ours = Some(team.to_string());
        if team_is_home {
            Matchup {
                home: ours,
                visitor: opponent,
            }
        } else {
            Matchup {
                home: opponent,
                visitor: ours,
            }
        }
    }

    /// The visitor bats in the top half, the home team in the bottom.
    pub fn offense(&self, half: Half) -> Option<&str> {
        match half {
            Half::Top => self.visitor.as_deref(),
            Half::Bottom => self.home.as_deref(),
        }
    }

    pub fn defense(&self, half: Half) -> Option<&str> {
        self.offense(half.flip())
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub situation: Situation,
    /// Game date (`YYYY-MM-DD`) stamped onto committed records.
    pub date: String,
    pub matchup: Matchup,
}

impl GameSession {
    /// A fresh game at the top of the first inning, dated today.
    pub fn new(matchup: Matchup) -> Self {
        let mut session = GameSession {
            situation: Situation::default(),
            date: today(),
            matchup,
        };
        session.sync_teams();
        session
    }

    /// Stamp offense/defense from the matchup for the current half.
    pub fn sync_teams(&mut self) {
        let half = self.situation.half;
        self.situation.offense_team = self.matchup.offense(half).map(str::to_string);
        self.situation.defense_team = self.matchup.defense(half).map(str::to_string);
    }

    pub fn set_matchup(&mut self, matchup: Matchup) {
        self.matchup = matchup;
        self.sync_teams();
    }

    // --- Situation editing ---

    pub fn set_inning(&mut self, inning: u8) -> Result<(), SessionError> {
        if inning == 0 {
            return Err(SessionError::InvalidInning);
        }
        self.situation.inning = inning;
        Ok(())
    }

    pub fn set_half(&mut self, half: Half) {
        self.situation.half = half;
        self.sync_teams();
    }

    pub fn set_outs(&mut self, outs: u8) -> Result<(), SessionError> {
        if outs > 2 {
            return Err(SessionError::InvalidOuts(outs));
        }
        self.situation.outs = outs;
        Ok(())
    }

    pub fn set_runners(&mut self, runners: RunnerState) {
        self.situation.runners = runners;
    }

    pub fn toggle_base(&mut self, base: u8) -> Result<(), SessionError> {
        if !(1..=3).contains(&base) {
            return Err(SessionError::InvalidBase(base));
        }
        self.situation.runners = self.situation.runners.toggle(base);
        Ok(())
    }

    pub fn set_score(&mut self, score: ScoreDiff) {
        self.situation.score_diff = score;
    }

    pub fn set_count(&mut self, count: Count) -> Result<(), SessionError> {
        check_count(count)?;
        self.situation.count = count;
        Ok(())
    }

    pub fn reset_count(&mut self) {
        self.situation.count = Count::FRESH;
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    // --- Play lifecycle ---

    /// Evaluate `result` against the current situation, append the record to
    /// `records`, and advance the situation to where the next play starts.
    pub fn commit(
        &mut self,
        result: PlayResult,
        records: &mut Vec<PlayRecord>,
    ) -> Result<PlayRecord, SessionError> {
        if result.next_outs > 3 {
            return Err(SessionError::InvalidNextOuts(result.next_outs));
        }
        check_count(result.next_count)?;

        let id = uuid::Uuid::new_v4().to_string();
        let record = PlayRecord::compute(id, self.date.clone(), &self.situation, &result);
        records.push(record.clone());

        info!(
            state = %record.state_id,
            action = record.action.key(),
            outcome = record.result_type.key(),
            pev = record.pev,
            "play committed"
        );

        self.advance(&result);
        Ok(record)
    }

    fn advance(&mut self, result: &PlayResult) {
        let s = &mut self.situation;
        if result.next_outs >= 3 {
            if s.half == Half::Bottom {
                s.inning = s.inning.saturating_add(1);
            }
            s.half = s.half.flip();
            s.outs = 0;
            s.runners = RunnerState::Empty;
            s.count = Count::FRESH;
            debug!(inning = s.inning, half = %s.half, "side retired");
            self.sync_teams();
            return;
        }

        s.outs = result.next_outs;
        s.runners = result.next_runners;
        s.count = if result.outcome.ends_appearance() {
            Count::FRESH
        } else {
            result.next_count
        };
    }

    /// Remove the last record and put the situation back to where that play
    /// started. `None` when there is nothing to undo.
    pub fn undo(&mut self, records: &mut Vec<PlayRecord>) -> Option<PlayRecord> {
        let record = records.pop()?;
        self.situation = record.game_state.clone();
        info!(state = %record.state_id, id = %record.id, "play undone");
        Some(record)
    }

    /// Top of the next inning with empty bases, no outs and a fresh count.
    pub fn next_inning(&mut self) {
        let s = &mut self.situation;
        s.inning = s.inning.saturating_add(1);
        s.half = Half::Top;
        s.outs = 0;
        s.runners = RunnerState::Empty;
        s.count = Count::FRESH;
        self.sync_teams();
    }
}

fn check_count(count: Count) -> Result<(), SessionError> {
    if count.is_valid() {
        Ok(())
    } else {
        Err(SessionError::InvalidCount {
            balls: count.balls,
            strikes: count.strikes,
        })
    }
}

/// Local calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use waves_core::{Action, Outcome};

    fn session() -> GameSession {
        let mut s = GameSession::new(Matchup::new("Waves", false, Some("Shrikes".into())));
        s.set_date("2025-05-01");
        s
    }

    fn result(outcome: Outcome, next_outs: u8, next_runners: RunnerState) -> PlayResult {
        PlayResult {
            action: Action::Attack,
            outcome,
            runs_scored: 0,
            next_outs,
            next_runners,
            next_count: Count::FRESH,
            pitch_count: None,
        }
    }

    #[test]
    fn matchup_assigns_offense_by_half() {
        let away = Matchup::new("Waves", false, Some("Shrikes".into()));
        assert_eq!(away.offense(Half::Top), Some("Waves"));
        assert_eq!(away.defense(Half::Top), Some("Shrikes"));
        assert_eq!(away.offense(Half::Bottom), Some("Shrikes"));

        let home = Matchup::new("Waves", true, None);
        assert_eq!(home.offense(Half::Bottom), Some("Waves"));
        assert_eq!(home.offense(Half::Top), None);
        assert_eq!(home.defense(Half::Bottom), None);
    }

    #[test]
    fn new_session_starts_at_top_of_first() {
        let s = session();
        assert_eq!(s.situation.inning, 1);
        assert_eq!(s.situation.half, Half::Top);
        assert_eq!(s.situation.offense_team.as_deref(), Some("Waves"));
        assert_eq!(s.situation.defense_team.as_deref(), Some("Shrikes"));
    }

    #[test]
    fn setters_validate_ranges() {
        let mut s = session();
        assert_eq!(s.set_inning(0), Err(SessionError::InvalidInning));
        assert_eq!(s.set_outs(3), Err(SessionError::InvalidOuts(3)));
        assert!(s.set_count(Count::new(4, 0)).is_err());
        assert_eq!(s.toggle_base(4), Err(SessionError::InvalidBase(4)));

        s.set_inning(12).unwrap();
        s.set_outs(2).unwrap();
        s.set_count(Count::new(3, 2)).unwrap();
        s.toggle_base(1).unwrap();
        s.toggle_base(3).unwrap();
        assert_eq!(s.situation.inning, 12);
        assert_eq!(s.situation.runners, RunnerState::FirstThird);

        s.reset_count();
        assert_eq!(s.situation.count, Count::FRESH);

        s.set_half(Half::Bottom);
        assert_eq!(s.situation.offense_team.as_deref(), Some("Shrikes"));
    }

    #[test]
    fn commit_appends_and_advances() {
        let mut s = session();
        s.set_count(Count::new(2, 1)).unwrap();
        let mut records = Vec::new();

        let rec = s
            .commit(result(Outcome::Single, 0, RunnerState::First), &mut records)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(rec.state_id, "early_tie_0_000_2-1");
        assert_eq!(rec.pitch_count, None);
        assert_eq!(rec.offense_team.as_deref(), Some("Waves"));
        assert_eq!(rec.date, "2025-05-01");
        assert!(uuid::Uuid::parse_str(&rec.id).is_ok());

        assert_eq!(s.situation.runners, RunnerState::First);
        assert_eq!(s.situation.outs, 0);
        assert_eq!(s.situation.count, Count::FRESH);
    }

    #[test]
    fn continuing_pitch_keeps_after_count() {
        let mut s = session();
        let mut records = Vec::new();
        let mut r = result(Outcome::BallTaken, 0, RunnerState::Empty);
        r.action = Action::Take;
        r.next_count = Count::new(1, 0);

        let rec = s.commit(r, &mut records).unwrap();
        assert_eq!(rec.pitch_count, None);
        assert_eq!(s.situation.count, Count::new(1, 0));
    }

    #[test]
    fn explicit_pitch_count_is_kept() {
        let mut s = session();
        let mut records = Vec::new();
        let mut r = result(Outcome::Strikeout, 1, RunnerState::Empty);
        r.pitch_count = Some(9);
        let rec = s.commit(r, &mut records).unwrap();
        assert_eq!(rec.pitch_count, Some(9));
    }

    #[test]
    fn unentered_pitch_count_stays_missing() {
        let mut s = session();
        s.set_count(Count::new(3, 2)).unwrap();
        let mut records = Vec::new();

        let rec = s
            .commit(result(Outcome::Single, 0, RunnerState::First), &mut records)
            .unwrap();
        assert_eq!(rec.pitch_count, None);

        let stats = waves_core::aggregate(&rec.state_id, &records);
        assert_eq!(stats.len(), 1);
        assert!((stats[0].avg_pitches - 1.0).abs() < 1e-9);
    }

    #[test]
    fn third_out_flips_half_and_clears_state() {
        let mut s = session();
        s.set_outs(2).unwrap();
        s.set_runners(RunnerState::Loaded);
        let mut records = Vec::new();

        s.commit(result(Outcome::FlyOut, 3, RunnerState::Loaded), &mut records)
            .unwrap();
        assert_eq!(s.situation.inning, 1);
        assert_eq!(s.situation.half, Half::Bottom);
        assert_eq!(s.situation.outs, 0);
        assert_eq!(s.situation.runners, RunnerState::Empty);
        assert_eq!(s.situation.offense_team.as_deref(), Some("Shrikes"));

        s.set_outs(2).unwrap();
        s.commit(result(Outcome::Strikeout, 3, RunnerState::Empty), &mut records)
            .unwrap();
        assert_eq!(s.situation.inning, 2);
        assert_eq!(s.situation.half, Half::Top);
    }

    #[test]
    fn commit_rejects_bad_after_state() {
        let mut s = session();
        let mut records = Vec::new();
        assert_eq!(
            s.commit(result(Outcome::Single, 4, RunnerState::First), &mut records),
            Err(SessionError::InvalidNextOuts(4))
        );
        assert!(records.is_empty());
    }

    #[test]
    fn undo_restores_before_snapshot() {
        let mut s = session();
        s.set_outs(1).unwrap();
        s.set_runners(RunnerState::FirstThird);
        s.set_count(Count::new(2, 1)).unwrap();
        let before = s.situation.clone();
        let mut records = Vec::new();

        s.commit(result(Outcome::DoublePlay, 3, RunnerState::Empty), &mut records)
            .unwrap();
        assert_ne!(s.situation, before);

        let undone = s.undo(&mut records).unwrap();
        assert_eq!(undone.result_type, Outcome::DoublePlay);
        assert!(records.is_empty());
        assert_eq!(s.situation, before);

        assert!(s.undo(&mut records).is_none());
    }

    #[test]
    fn next_inning_resets_to_top() {
        let mut s = session();
        s.set_half(Half::Bottom);
        s.set_outs(2).unwrap();
        s.set_runners(RunnerState::Second);
        s.next_inning();
        assert_eq!(s.situation.inning, 2);
        assert_eq!(s.situation.half, Half::Top);
        assert_eq!(s.situation.outs, 0);
        assert_eq!(s.situation.runners, RunnerState::Empty);
        assert_eq!(s.situation.offense_team.as_deref(), Some("Waves"));
    }

    #[test]
    fn session_serializes_with_flat_count() {
        let s = session();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["situation"]["topBottom"], "top");
        assert_eq!(json["situation"]["balls"], 0);
        let back: GameSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
