// Command-line surface of the `waves` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use waves_core::{
    Action, AfterState, Count, Half, Outcome, PlayResult, RunnerState, ScoreDiff, Situation,
};

use crate::app::SituationUpdate;
use crate::config::ScopeKind;

#[derive(Parser, Debug)]
#[command(name = "waves")]
#[command(
    about = "Log plays, track run expectancy, and rank offensive strategies",
    long_about = None
)]
pub struct Cli {
    /// Project directory holding config/, defaults/, data/ and logs/
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current situation, its run expectancy and ranked strategies
    Status,
    /// Edit fields of the current situation
    Set(SetArgs),
    /// Add or remove a runner on base 1, 2 or 3
    ToggleBase {
        base: u8,
    },
    /// Commit the result of a play from the current situation
    Log(LogArgs),
    /// Remove the last logged play and restore its situation
    Undo,
    /// Move to the top of the next inning
    NextInning,
    /// Rank strategies for the current situation
    Analyze {
        /// team or all
        #[arg(long, value_parser = parse_scope)]
        scope: Option<ScopeKind>,
    },
    /// Ask the LLM coach for a recommendation
    Advise {
        /// team or all
        #[arg(long, value_parser = parse_scope)]
        scope: Option<ScopeKind>,
    },
    /// Look up run expectancy
    Re {
        #[arg(long)]
        outs: u8,
        /// Runner code such as 000, 120 or 123
        #[arg(long, value_parser = RunnerState::parse)]
        runners: RunnerState,
        #[arg(long, value_parser = Count::parse, default_value = "0-0")]
        count: Count,
    },
    /// Evaluate a hypothetical play without logging it
    Pev(PevArgs),
    /// Write the play history to a JSON file
    Export {
        path: PathBuf,
    },
    /// Replace the play history with an exported JSON file
    Import {
        path: PathBuf,
        /// Confirm replacing the current history
        #[arg(long)]
        yes: bool,
    },
    /// League team roster
    Teams {
        #[command(subcommand)]
        action: TeamsCommand,
    },
    /// Set today's opponent (omit the name to clear it)
    Opponent {
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamsCommand {
    /// List registered teams
    List,
    /// Register a team
    Add {
        name: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    #[arg(long)]
    pub inning: Option<u8>,
    /// top or bottom
    #[arg(long, value_parser = Half::parse)]
    pub half: Option<Half>,
    #[arg(long)]
    pub outs: Option<u8>,
    /// Runner code such as 000, 120 or 123
    #[arg(long, value_parser = RunnerState::parse)]
    pub runners: Option<RunnerState>,
    /// win_big, win_small, tie, lose_small or lose_big
    #[arg(long, value_parser = ScoreDiff::parse)]
    pub score: Option<ScoreDiff>,
    /// Offense runs minus defense runs; bucketed into a score class
    #[arg(long, allow_negative_numbers = true, conflicts_with = "score")]
    pub run_diff: Option<i32>,
    /// Balls-strikes, e.g. 2-1
    #[arg(long, value_parser = Count::parse)]
    pub count: Option<Count>,
    /// Game date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
}

impl From<SetArgs> for SituationUpdate {
    fn from(args: SetArgs) -> Self {
        SituationUpdate {
            inning: args.inning,
            half: args.half,
            outs: args.outs,
            runners: args.runners,
            score: args.score.or(args.run_diff.map(ScoreDiff::from_runs)),
            count: args.count,
            date: args.date,
        }
    }
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Tactic that was called, e.g. attack, sacrifice_bunt, steal
    #[arg(long, value_parser = Action::parse)]
    pub action: Action,
    /// What happened, e.g. single, grounder, strikeout_looking, ball_taken
    #[arg(long = "result", value_parser = Outcome::parse)]
    pub outcome: Outcome,
    #[arg(long, default_value_t = 0)]
    pub runs: u32,
    /// Outs after the play (3 ends the half)
    #[arg(long)]
    pub outs: u8,
    /// Runners after the play
    #[arg(long, value_parser = RunnerState::parse)]
    pub runners: RunnerState,
    /// Count after a pitch that did not end the plate appearance
    #[arg(long, value_parser = Count::parse, default_value = "0-0")]
    pub count: Count,
    /// Pitches seen in the plate appearance
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub pitches: Option<u32>,
}

impl From<LogArgs> for PlayResult {
    fn from(args: LogArgs) -> Self {
        PlayResult {
            action: args.action,
            outcome: args.outcome,
            runs_scored: args.runs,
            next_outs: args.outs,
            next_runners: args.runners,
            next_count: args.count,
            pitch_count: args.pitches,
        }
    }
}

#[derive(Args, Debug)]
pub struct PevArgs {
    #[arg(long)]
    pub outs: u8,
    #[arg(long, value_parser = RunnerState::parse)]
    pub runners: RunnerState,
    #[arg(long, value_parser = Count::parse, default_value = "0-0")]
    pub count: Count,
    #[arg(long = "result", value_parser = Outcome::parse)]
    pub outcome: Outcome,
    #[arg(long, default_value_t = 0)]
    pub runs: u32,
    #[arg(long)]
    pub next_outs: u8,
    #[arg(long, value_parser = RunnerState::parse)]
    pub next_runners: RunnerState,
    #[arg(long, value_parser = Count::parse, default_value = "0-0")]
    pub next_count: Count,
}

impl PevArgs {
    pub fn before(&self) -> Situation {
        Situation {
            outs: self.outs,
            runners: self.runners,
            count: self.count,
            ..Situation::default()
        }
    }

    pub fn after(&self) -> AfterState {
        AfterState::new(self.next_outs, self.next_runners).with_count(self.next_count)
    }
}

fn parse_scope(s: &str) -> Result<ScopeKind, String> {
    ScopeKind::parse(s).ok_or_else(|| format!("unknown scope {s:?}; expected team or all"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_log_command() {
        let cli = Cli::try_parse_from([
            "waves",
            "log",
            "--action",
            "sacrifice-bunt",
            "--result",
            "sacrifice_bunt",
            "--outs",
            "1",
            "--runners",
            "020",
        ])
        .unwrap();
        let Command::Log(args) = cli.command else {
            panic!("expected log command");
        };
        let result = PlayResult::from(args);
        assert_eq!(result.action, Action::SacrificeBunt);
        assert_eq!(result.outcome, Outcome::SacrificeBunt);
        assert_eq!(result.next_runners, RunnerState::Second);
        assert_eq!(result.next_count, Count::FRESH);
        assert_eq!(result.pitch_count, None);
    }

    #[test]
    fn parses_set_command() {
        let cli = Cli::try_parse_from([
            "waves",
            "--dir",
            "/tmp/w",
            "set",
            "--half",
            "bottom",
            "--count",
            "3-1",
            "--score",
            "lose_small",
        ])
        .unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/w")));
        let Command::Set(args) = cli.command else {
            panic!("expected set command");
        };
        let update = SituationUpdate::from(args);
        assert_eq!(update.half, Some(Half::Bottom));
        assert_eq!(update.count, Some(Count::new(3, 1)));
        assert_eq!(update.score, Some(ScoreDiff::LoseSmall));
        assert!(update.inning.is_none());
    }

    fn parse_set(extra: &[&str]) -> SituationUpdate {
        let mut argv = vec!["waves", "set"];
        argv.extend_from_slice(extra);
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Set(args) = cli.command else {
            panic!("expected set command");
        };
        SituationUpdate::from(args)
    }

    #[test]
    fn run_diff_is_bucketed_into_score() {
        fn score(extra: &[&str]) -> Option<ScoreDiff> {
            parse_set(extra).score
        }
        assert_eq!(score(&["--run-diff", "-2"]), Some(ScoreDiff::LoseSmall));
        assert_eq!(score(&["--run-diff=-4"]), Some(ScoreDiff::LoseBig));
        assert_eq!(score(&["--run-diff", "3"]), Some(ScoreDiff::WinBig));
        assert_eq!(score(&["--run-diff", "0"]), Some(ScoreDiff::Tie));

        let both = ["waves", "set", "--score", "tie", "--run-diff", "1"];
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn log_rejects_zero_pitches() {
        let log = |pitches: &'static str| {
            [
                "waves", "log", "--action", "attack", "--result", "single", "--outs", "0",
                "--runners", "100", "--pitches", pitches,
            ]
        };

        assert!(Cli::try_parse_from(log("0")).is_err());
        let cli = Cli::try_parse_from(log("4")).unwrap();
        let Command::Log(args) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(PlayResult::from(args).pitch_count, Some(4));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Cli::try_parse_from(["waves", "set", "--count", "4-0"]).is_err());
        assert!(Cli::try_parse_from(["waves", "analyze", "--scope", "league"]).is_err());
        assert!(Cli::try_parse_from(["waves", "re", "--outs", "1", "--runners", "999"]).is_err());
    }

    #[test]
    fn parses_scope_and_teams() {
        let cli = Cli::try_parse_from(["waves", "advise", "--scope", "all"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Advise {
                scope: Some(ScopeKind::All)
            }
        ));

        let cli = Cli::try_parse_from(["waves", "teams", "add", "Himeji Egrets"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Teams {
                action: TeamsCommand::Add { ref name }
            } if name == "Himeji Egrets"
        ));
    }
}
