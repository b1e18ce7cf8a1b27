// Tactical actions and play outcome categories.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::situation::ParseEnumError;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The tactic the offense chose before the pitch.
///
/// Each variant also deserializes from the Japanese name used by older
/// exported logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Swing away.
    #[serde(alias = "強攻")]
    Attack,
    #[serde(alias = "送りバント")]
    SacrificeBunt,
    #[serde(alias = "セーフティ")]
    SafetyBunt,
    /// Runner goes on the pitch, batter swings only at strikes.
    #[serde(alias = "エンドラン")]
    RunAndHit,
    #[serde(alias = "ヒットエンドラン")]
    HitAndRun,
    #[serde(alias = "盗塁")]
    Steal,
    /// Take the pitch.
    #[serde(alias = "待球")]
    Take,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Attack,
        Action::SacrificeBunt,
        Action::SafetyBunt,
        Action::RunAndHit,
        Action::HitAndRun,
        Action::Steal,
        Action::Take,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Action::Attack => "attack",
            Action::SacrificeBunt => "sacrifice_bunt",
            Action::SafetyBunt => "safety_bunt",
            Action::RunAndHit => "run_and_hit",
            Action::HitAndRun => "hit_and_run",
            Action::Steal => "steal",
            Action::Take => "take",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Attack => "swing away",
            Action::SacrificeBunt => "sacrifice bunt",
            Action::SafetyBunt => "safety bunt",
            Action::RunAndHit => "run-and-hit",
            Action::HitAndRun => "hit-and-run",
            Action::Steal => "steal",
            Action::Take => "take",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Action::ALL
            .iter()
            .find(|a| a.key() == normalized)
            .copied()
            .ok_or_else(|| ParseEnumError::new("action", s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Whether a plate appearance is still in progress after an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatePhase {
    /// A single pitch event; the same batter stays up with the new count.
    Continuing,
    /// The plate appearance is over; the next batter starts at 0-0.
    Ending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    // Hits
    #[serde(alias = "本塁打")]
    HomeRun,
    #[serde(alias = "三塁打")]
    Triple,
    #[serde(alias = "二塁打")]
    Double,
    #[serde(alias = "単打")]
    Single,
    #[serde(alias = "安打(その他)")]
    Hit,

    // Outs in play
    #[serde(alias = "内野ゴロ")]
    Grounder,
    #[serde(alias = "外野フライ")]
    FlyOut,
    #[serde(alias = "ライナー")]
    LineOut,
    #[serde(alias = "内野フライ")]
    PopOut,
    #[serde(alias = "併殺打")]
    DoublePlay,
    #[serde(alias = "三重殺")]
    TriplePlay,

    // Sacrifices
    #[serde(alias = "犠打(バント)")]
    SacrificeBunt,
    #[serde(alias = "犠飛")]
    SacrificeFly,

    // Free bases
    #[serde(alias = "四球")]
    Walk,
    #[serde(alias = "死球")]
    HitByPitch,
    #[serde(alias = "敬遠")]
    IntentionalWalk,

    // Strikeouts
    #[serde(alias = "三振(その他)")]
    Strikeout,
    #[serde(alias = "空振り三振")]
    StrikeoutSwinging,
    #[serde(alias = "見逃し三振")]
    StrikeoutLooking,
    /// Uncaught third strike.
    #[serde(alias = "振り逃げ")]
    StrikeoutUncaught,

    // Defensive mistakes
    #[serde(alias = "失策")]
    Error,
    #[serde(alias = "野選")]
    FieldersChoice,

    // Pitch events
    #[serde(alias = "ボール(見送)")]
    BallTaken,
    #[serde(alias = "ストライク(見送)")]
    StrikeTaken,
    #[serde(alias = "空振り")]
    SwingingStrike,
    #[serde(alias = "ファウル")]
    Foul,
}

/// Heavier penalty for a called third strike than for going down swinging.
pub const STRIKEOUT_LOOKING_PENALTY: f64 = -0.25;
pub const STRIKEOUT_PENALTY: f64 = -0.15;
pub const DOUBLE_PLAY_PENALTY: f64 = -0.50;
/// Contact that forced the defense into an error.
pub const ERROR_INDUCED_BONUS: f64 = 0.30;

impl Outcome {
    pub const ALL: [Outcome; 26] = [
        Outcome::HomeRun,
        Outcome::Triple,
        Outcome::Double,
        Outcome::Single,
        Outcome::Hit,
        Outcome::Grounder,
        Outcome::FlyOut,
        Outcome::LineOut,
        Outcome::PopOut,
        Outcome::DoublePlay,
        Outcome::TriplePlay,
        Outcome::SacrificeBunt,
        Outcome::SacrificeFly,
        Outcome::Walk,
        Outcome::HitByPitch,
        Outcome::IntentionalWalk,
        Outcome::Strikeout,
        Outcome::StrikeoutSwinging,
        Outcome::StrikeoutLooking,
        Outcome::StrikeoutUncaught,
        Outcome::Error,
        Outcome::FieldersChoice,
        Outcome::BallTaken,
        Outcome::StrikeTaken,
        Outcome::SwingingStrike,
        Outcome::Foul,
    ];

    pub fn phase(&self) -> PlatePhase {
        match self {
            Outcome::BallTaken | Outcome::StrikeTaken | Outcome::SwingingStrike | Outcome::Foul => {
                PlatePhase::Continuing
            }
            Outcome::HomeRun
            | Outcome::Triple
            | Outcome::Double
            | Outcome::Single
            | Outcome::Hit
            | Outcome::Grounder
            | Outcome::FlyOut
            | Outcome::LineOut
            | Outcome::PopOut
            | Outcome::DoublePlay
            | Outcome::TriplePlay
            | Outcome::SacrificeBunt
            | Outcome::SacrificeFly
            | Outcome::Walk
            | Outcome::HitByPitch
            | Outcome::IntentionalWalk
            | Outcome::Strikeout
            | Outcome::StrikeoutSwinging
            | Outcome::StrikeoutLooking
            | Outcome::StrikeoutUncaught
            | Outcome::Error
            | Outcome::FieldersChoice => PlatePhase::Ending,
        }
    }

    pub fn ends_appearance(&self) -> bool {
        self.phase() == PlatePhase::Ending
    }

    /// Fixed strategic penalty or bonus added on top of the run-expectancy
    /// delta.
    pub fn risk_adjustment(&self) -> f64 {
        match self {
            Outcome::StrikeoutLooking => STRIKEOUT_LOOKING_PENALTY,
            Outcome::Strikeout | Outcome::StrikeoutSwinging => STRIKEOUT_PENALTY,
            Outcome::DoublePlay => DOUBLE_PLAY_PENALTY,
            Outcome::Error => ERROR_INDUCED_BONUS,
            _ => 0.0,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Outcome::HomeRun => "home_run",
            Outcome::Triple => "triple",
            Outcome::Double => "double",
            Outcome::Single => "single",
            Outcome::Hit => "hit",
            Outcome::Grounder => "grounder",
            Outcome::FlyOut => "fly_out",
            Outcome::LineOut => "line_out",
            Outcome::PopOut => "pop_out",
            Outcome::DoublePlay => "double_play",
            Outcome::TriplePlay => "triple_play",
            Outcome::SacrificeBunt => "sacrifice_bunt",
            Outcome::SacrificeFly => "sacrifice_fly",
            Outcome::Walk => "walk",
            Outcome::HitByPitch => "hit_by_pitch",
            Outcome::IntentionalWalk => "intentional_walk",
            Outcome::Strikeout => "strikeout",
            Outcome::StrikeoutSwinging => "strikeout_swinging",
            Outcome::StrikeoutLooking => "strikeout_looking",
            Outcome::StrikeoutUncaught => "strikeout_uncaught",
            Outcome::Error => "error",
            Outcome::FieldersChoice => "fielders_choice",
            Outcome::BallTaken => "ball_taken",
            Outcome::StrikeTaken => "strike_taken",
            Outcome::SwingingStrike => "swinging_strike",
            Outcome::Foul => "foul",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::HomeRun => "home run",
            Outcome::Triple => "triple",
            Outcome::Double => "double",
            Outcome::Single => "single",
            Outcome::Hit => "hit (other)",
            Outcome::Grounder => "ground out",
            Outcome::FlyOut => "fly out",
            Outcome::LineOut => "line out",
            Outcome::PopOut => "infield pop out",
            Outcome::DoublePlay => "double play",
            Outcome::TriplePlay => "triple play",
            Outcome::SacrificeBunt => "sacrifice bunt",
            Outcome::SacrificeFly => "sacrifice fly",
            Outcome::Walk => "walk",
            Outcome::HitByPitch => "hit by pitch",
            Outcome::IntentionalWalk => "intentional walk",
            Outcome::Strikeout => "strikeout (other)",
            Outcome::StrikeoutSwinging => "strikeout swinging",
            Outcome::StrikeoutLooking => "strikeout looking",
            Outcome::StrikeoutUncaught => "uncaught third strike",
            Outcome::Error => "reached on error",
            Outcome::FieldersChoice => "fielder's choice",
            Outcome::BallTaken => "ball (taken)",
            Outcome::StrikeTaken => "strike (taken)",
            Outcome::SwingingStrike => "swinging strike",
            Outcome::Foul => "foul",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Outcome::ALL
            .iter()
            .find(|o| o.key() == normalized)
            .copied()
            .ok_or_else(|| ParseEnumError::new("outcome", s))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_four_pitch_events_continue() {
        let continuing: Vec<Outcome> = Outcome::ALL
            .iter()
            .copied()
            .filter(|o| o.phase() == PlatePhase::Continuing)
            .collect();
        assert_eq!(
            continuing,
            vec![
                Outcome::BallTaken,
                Outcome::StrikeTaken,
                Outcome::SwingingStrike,
                Outcome::Foul
            ]
        );
    }

    #[test]
    fn double_play_is_heaviest_penalty() {
        let min = Outcome::ALL
            .iter()
            .map(|o| o.risk_adjustment())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(min, DOUBLE_PLAY_PENALTY);
        assert!(
            Outcome::StrikeoutLooking.risk_adjustment()
                < Outcome::StrikeoutSwinging.risk_adjustment()
        );
        assert_eq!(Outcome::Strikeout.risk_adjustment(), STRIKEOUT_PENALTY);
        assert!(Outcome::Error.risk_adjustment() > 0.0);
    }

    #[test]
    fn unpenalized_outcomes_are_zero() {
        for o in [
            Outcome::Single,
            Outcome::Grounder,
            Outcome::TriplePlay,
            Outcome::StrikeoutUncaught,
            Outcome::FieldersChoice,
            Outcome::BallTaken,
        ] {
            assert_eq!(o.risk_adjustment(), 0.0, "{o:?}");
        }
    }

    #[test]
    fn keys_parse_back() {
        for o in Outcome::ALL {
            assert_eq!(Outcome::parse(o.key()).unwrap(), o);
        }
        for a in Action::ALL {
            assert_eq!(Action::parse(a.key()).unwrap(), a);
        }
        assert_eq!(Action::parse("hit-and-run").unwrap(), Action::HitAndRun);
        assert!(Action::parse("squeeze").is_err());
    }

    #[test]
    fn serde_names_match_keys() {
        for o in Outcome::ALL {
            let json = serde_json::to_string(&o).unwrap();
            assert_eq!(json, format!("\"{}\"", o.key()));
        }
        for a in Action::ALL {
            let json = serde_json::to_string(&a).unwrap();
            assert_eq!(json, format!("\"{}\"", a.key()));
        }
    }

    #[test]
    fn japanese_names_deserialize_but_are_not_written() {
        let cases = [
            ("\"ボール(見送)\"", Outcome::BallTaken),
            ("\"見逃し三振\"", Outcome::StrikeoutLooking),
            ("\"併殺打\"", Outcome::DoublePlay),
            ("\"安打(その他)\"", Outcome::Hit),
        ];
        for (json, expected) in cases {
            let o: Outcome = serde_json::from_str(json).unwrap();
            assert_eq!(o, expected);
            assert_eq!(serde_json::to_string(&o).unwrap(), format!("\"{}\"", o.key()));
        }
        let a: Action = serde_json::from_str("\"ヒットエンドラン\"").unwrap();
        assert_eq!(a, Action::HitAndRun);
        let a: Action = serde_json::from_str("\"エンドラン\"").unwrap();
        assert_eq!(a, Action::RunAndHit);
    }
}
