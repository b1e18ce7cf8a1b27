// In-game situation model and the fingerprint used to group equivalent situations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Returned when a string does not name a known enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Half inning
// ---------------------------------------------------------------------------

// Aliases accept logs written by the Japanese-language scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    #[serde(alias = "表")]
    Top,
    #[serde(alias = "裏")]
    Bottom,
}

impl Half {
    pub fn flip(self) -> Self {
        match self {
            Half::Top => Half::Bottom,
            Half::Bottom => Half::Top,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "t" => Ok(Half::Top),
            "bottom" | "bot" | "b" => Ok(Half::Bottom),
            _ => Err(ParseEnumError::new("half", s)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Half::Top => "top",
            Half::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Runner occupancy
// ---------------------------------------------------------------------------

/// One of the eight base-occupancy patterns.
///
/// Serialized as a three-character code where each position holds the base
/// number when occupied and `0` when empty (`"103"` = runners on first and
/// third).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunnerState {
    #[serde(rename = "000")]
    Empty,
    #[serde(rename = "100")]
    First,
    #[serde(rename = "020")]
    Second,
    #[serde(rename = "003")]
    Third,
    #[serde(rename = "120")]
    FirstSecond,
    #[serde(rename = "103")]
    FirstThird,
    #[serde(rename = "023")]
    SecondThird,
    #[serde(rename = "123")]
    Loaded,
}

impl RunnerState {
    pub const ALL: [RunnerState; 8] = [
        RunnerState::Empty,
        RunnerState::First,
        RunnerState::Second,
        RunnerState::Third,
        RunnerState::FirstSecond,
        RunnerState::FirstThird,
        RunnerState::SecondThird,
        RunnerState::Loaded,
    ];

    /// Build a pattern from `[first, second, third]` occupancy flags.
    pub fn from_bases(bases: [bool; 3]) -> Self {
        match bases {
            [false, false, false] => RunnerState::Empty,
            [true, false, false] => RunnerState::First,
            [false, true, false] => RunnerState::Second,
            [false, false, true] => RunnerState::Third,
            [true, true, false] => RunnerState::FirstSecond,
            [true, false, true] => RunnerState::FirstThird,
            [false, true, true] => RunnerState::SecondThird,
            [true, true, true] => RunnerState::Loaded,
        }
    }

    /// Occupancy flags `[first, second, third]`.
    pub fn bases(&self) -> [bool; 3] {
        match self {
            RunnerState::Empty => [false, false, false],
            RunnerState::First => [true, false, false],
            RunnerState::Second => [false, true, false],
            RunnerState::Third => [false, false, true],
            RunnerState::FirstSecond => [true, true, false],
            RunnerState::FirstThird => [true, false, true],
            RunnerState::SecondThird => [false, true, true],
            RunnerState::Loaded => [true, true, true],
        }
    }

    /// Flip occupancy of a single base (1, 2 or 3). Other values leave the
    /// pattern unchanged.
    pub fn toggle(self, base: u8) -> Self {
        let mut bases = self.bases();
        match base {
            1..=3 => {
                let idx = usize::from(base - 1);
                bases[idx] = !bases[idx];
                RunnerState::from_bases(bases)
            }
            _ => self,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RunnerState::Empty => "000",
            RunnerState::First => "100",
            RunnerState::Second => "020",
            RunnerState::Third => "003",
            RunnerState::FirstSecond => "120",
            RunnerState::FirstThird => "103",
            RunnerState::SecondThird => "023",
            RunnerState::Loaded => "123",
        }
    }

    /// Human-readable description for prompts and status output.
    pub fn describe(&self) -> &'static str {
        match self {
            RunnerState::Empty => "bases empty",
            RunnerState::First => "runner on first",
            RunnerState::Second => "runner on second",
            RunnerState::Third => "runner on third",
            RunnerState::FirstSecond => "runners on first and second",
            RunnerState::FirstThird => "runners on first and third",
            RunnerState::SecondThird => "runners on second and third",
            RunnerState::Loaded => "bases loaded",
        }
    }

    /// Parse an occupancy code (`"120"`) or a named pattern (`"loaded"`).
    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some(found) = RunnerState::ALL.iter().find(|r| r.code() == lowered) {
            return Ok(*found);
        }
        match lowered.as_str() {
            "none" | "empty" => Ok(RunnerState::Empty),
            "first" | "1b" => Ok(RunnerState::First),
            "second" | "2b" => Ok(RunnerState::Second),
            "third" | "3b" => Ok(RunnerState::Third),
            "first_second" => Ok(RunnerState::FirstSecond),
            "first_third" => Ok(RunnerState::FirstThird),
            "second_third" => Ok(RunnerState::SecondThird),
            "loaded" | "full" => Ok(RunnerState::Loaded),
            _ => Err(ParseEnumError::new("runner pattern", s)),
        }
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Score differential
// ---------------------------------------------------------------------------

/// Score differential from the offense's point of view, bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDiff {
    #[serde(alias = "+3以上")]
    WinBig,
    #[serde(alias = "+1〜2")]
    WinSmall,
    #[serde(alias = "同点")]
    Tie,
    #[serde(alias = "-1〜2")]
    LoseSmall,
    #[serde(alias = "-3以下")]
    LoseBig,
}

impl ScoreDiff {
    pub const ALL: [ScoreDiff; 5] = [
        ScoreDiff::WinBig,
        ScoreDiff::WinSmall,
        ScoreDiff::Tie,
        ScoreDiff::LoseSmall,
        ScoreDiff::LoseBig,
    ];

    /// Bucket an actual run differential (offense minus defense).
    pub fn from_runs(diff: i32) -> Self {
        match diff {
            d if d >= 3 => ScoreDiff::WinBig,
            1 | 2 => ScoreDiff::WinSmall,
            0 => ScoreDiff::Tie,
            -2 | -1 => ScoreDiff::LoseSmall,
            _ => ScoreDiff::LoseBig,
        }
    }

    /// Stable key used inside fingerprints and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            ScoreDiff::WinBig => "win_big",
            ScoreDiff::WinSmall => "win_small",
            ScoreDiff::Tie => "tie",
            ScoreDiff::LoseSmall => "lose_small",
            ScoreDiff::LoseBig => "lose_big",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreDiff::WinBig => "+3 or more",
            ScoreDiff::WinSmall => "+1 to +2",
            ScoreDiff::Tie => "tied",
            ScoreDiff::LoseSmall => "-1 to -2",
            ScoreDiff::LoseBig => "-3 or worse",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        let lowered = s.trim().to_ascii_lowercase();
        ScoreDiff::ALL
            .iter()
            .find(|d| d.key() == lowered)
            .copied()
            .ok_or_else(|| ParseEnumError::new("score differential", s))
    }
}

impl fmt::Display for ScoreDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Inning zone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InningZone {
    Early,
    Middle,
    Late,
}

impl InningZone {
    /// Innings 1-3 are early, 4-6 middle, 7 and later (extras included) late.
    pub fn of(inning: u8) -> Self {
        match inning {
            0..=3 => InningZone::Early,
            4..=6 => InningZone::Middle,
            _ => InningZone::Late,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            InningZone::Early => "early",
            InningZone::Middle => "middle",
            InningZone::Late => "late",
        }
    }
}

impl fmt::Display for InningZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Ball-strike count
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    /// The 0-0 count a new batter starts with.
    pub const FRESH: Count = Count {
        balls: 0,
        strikes: 0,
    };

    pub const fn new(balls: u8, strikes: u8) -> Self {
        Self { balls, strikes }
    }

    /// A count that can occur mid plate appearance (0-3 balls, 0-2 strikes).
    pub fn is_valid(&self) -> bool {
        self.balls <= 3 && self.strikes <= 2
    }

    /// Parse `"B-S"`, e.g. `"3-2"`.
    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        let (b, st) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ParseEnumError::new("count", s))?;
        let balls = b.parse().map_err(|_| ParseEnumError::new("count", s))?;
        let strikes = st.parse().map_err(|_| ParseEnumError::new("count", s))?;
        let count = Count::new(balls, strikes);
        if count.is_valid() {
            Ok(count)
        } else {
            Err(ParseEnumError::new("count", s))
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.balls, self.strikes)
    }
}

// ---------------------------------------------------------------------------
// Situation
// ---------------------------------------------------------------------------

/// Snapshot of the game state before a play.
///
/// Serialized flat (`balls` and `strikes` next to `outs`) so stored records
/// keep the same shape as the operator's input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    pub inning: u8,
    #[serde(rename = "topBottom")]
    pub half: Half,
    pub outs: u8,
    pub runners: RunnerState,
    pub score_diff: ScoreDiff,
    #[serde(flatten)]
    pub count: Count,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_team: Option<String>,
}

impl Default for Situation {
    fn default() -> Self {
        Self {
            inning: 1,
            half: Half::Top,
            outs: 0,
            runners: RunnerState::Empty,
            score_diff: ScoreDiff::Tie,
            count: Count::FRESH,
            offense_team: None,
            defense_team: None,
        }
    }
}

impl Situation {
    pub fn zone(&self) -> InningZone {
        InningZone::of(self.inning)
    }

    /// Key under which strategically equivalent situations are grouped:
    /// `{zone}_{score}_{outs}_{runners}_{balls}-{strikes}`.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.zone().key(),
            self.score_diff.key(),
            self.outs,
            self.runners.code(),
            self.count,
        )
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
