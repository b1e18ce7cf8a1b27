// Prompt templates for the in-game strategy coach.
//
// The prompt carries the pre-computed strategy table so the model reasons
// about trade-offs rather than recomputing averages.

use waves_core::{total_samples, Situation, StrategyStat};

/// Below this many samples the history is too thin to trust on its own.
pub const LOW_SAMPLE_THRESHOLD: usize = 5;
/// Above this many samples the team's own history should dominate.
pub const HIGH_SAMPLE_THRESHOLD: usize = 10;

/// Static system prompt for every advisory call.
pub fn system_prompt(team_name: &str, language: &str) -> String {
    format!(
        "You are the strategic coach for the {team_name} baseball team.\n\
         You advise on the offensive tactic for the current at-bat: swing away, \
         sacrifice bunt, safety bunt, run-and-hit, hit-and-run, steal, or take.\n\
         \n\
         PEV (Player Evaluation Value) = runs scored \
         + (run expectancy after - run expectancy before) \
         + a fixed risk adjustment (strikeouts and double plays are penalized, \
         reaching on an error is rewarded).\n\
         \n\
         Answer in {language}, in under 200 characters. Be direct."
    )
}

/// Build the user prompt for one situation and its aggregated history.
pub fn build_advice_prompt(situation: &Situation, stats: &[StrategyStat]) -> String {
    let samples = total_samples(stats);
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("## CURRENT SITUATION\n");
    prompt.push_str(&format_situation(situation));
    prompt.push('\n');

    prompt.push_str("## HISTORICAL DATA (team's actual results in this situation)\n");
    if stats.is_empty() {
        prompt.push_str("  (no recorded plays)\n");
    } else {
        for s in stats {
            prompt.push_str(&format_stat_line(s));
        }
    }
    prompt.push_str(&format!("Total samples: {samples}\n\n"));

    prompt.push_str(&format!(
        "## GUIDELINES\n\
         1. If total samples is low (under {LOW_SAMPLE_THRESHOLD}), rely more on general \
         baseball theory (run expectancy, count theory) and mention the lack of data.\n\
         2. If total samples is high (over {HIGH_SAMPLE_THRESHOLD}), rely heavily on the \
         historical data. If one action has a clearly higher average PEV, recommend it \
         strongly as a team trend.\n\
         3. Always consider the ball-strike count (3-0 green light vs 0-2 protect).\n\
         4. Treat PEV as the primary measure of success.\n\n"
    ));

    prompt.push_str("## WHAT SHOULD WE DO?\nGive one recommended action and the reason.");
    prompt
}

fn format_situation(s: &Situation) -> String {
    let mut out = format!(
        "  Inning: {} {} ({})\n\
         \x20 Score: {}\n\
         \x20 Outs: {}\n\
         \x20 Runners: {} ({})\n\
         \x20 Count: {} balls, {} strikes\n",
        s.half,
        s.inning,
        s.zone(),
        s.score_diff.label(),
        s.outs,
        s.runners.describe(),
        s.runners.code(),
        s.count.balls,
        s.count.strikes,
    );
    if let (Some(off), Some(def)) = (&s.offense_team, &s.defense_team) {
        out.push_str(&format!("  Matchup: {off} batting vs {def}\n"));
    }
    out
}

fn format_stat_line(s: &StrategyStat) -> String {
    format!(
        "  - Action: {}, Avg PEV: {:.3}, Success: {:.0}%, Avg pitches: {:.1}, Samples: {}\n",
        s.action.label(),
        s.avg_pev,
        s.success_rate * 100.0,
        s.avg_pitches,
        s.count,
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
