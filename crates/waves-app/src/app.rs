// Application state and command handlers.
//
// `App` owns the loaded config, the play history, the in-progress game
// session and the league roster. Every command mutates that state, persists
// what changed, and returns the text to print.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use waves_core::{
    aggregate, filter_scope, pev, recommend, run_expectancy, total_samples, AfterState, Count, Half,
    Outcome, PlayRecord, PlayResult, RunnerState, Scope, ScoreDiff, Situation, StrategyStat,
};
use waves_llm::{request_advice, AdviceSettings, LlmClient};

use crate::config::{Config, ScopeKind};
use crate::session::{GameSession, Matchup};
use crate::store::{read_json, write_json, LogStore};
use crate::teams::TeamRoster;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Fields of the current situation to overwrite; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct SituationUpdate {
    pub inning: Option<u8>,
    pub half: Option<Half>,
    pub outs: Option<u8>,
    pub runners: Option<RunnerState>,
    pub score: Option<ScoreDiff>,
    pub count: Option<Count>,
    pub date: Option<String>,
}

impl SituationUpdate {
    pub fn is_empty(&self) -> bool {
        self.inning.is_none()
            && self.half.is_none()
            && self.outs.is_none()
            && self.runners.is_none()
            && self.score.is_none()
            && self.count.is_none()
            && self.date.is_none()
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    config: Config,
    store: LogStore,
    records: Vec<PlayRecord>,
    session: GameSession,
    roster: TeamRoster,
    llm: LlmClient,
}

impl App {
    /// Load history, session and roster from the paths in `config`.
    pub fn open(config: Config) -> Result<Self> {
        let store = LogStore::new(config.log_path());
        let records = store.load().context("failed to load play log")?;

        let session = match read_json::<GameSession>(&config.session_path())
            .context("failed to load game session")?
        {
            Some(session) => session,
            None => GameSession::new(Matchup::new(&config.team.name, config.team.home, None)),
        };

        let roster = TeamRoster::load_or_seed(&config.teams_path(), &config.league.teams)
            .context("failed to load team roster")?;

        let llm = LlmClient::from_key(
            config.credentials.anthropic_api_key.as_deref(),
            &config.llm.model,
        );

        info!(
            records = records.len(),
            teams = roster.names().len(),
            llm = llm.is_active(),
            "application state loaded"
        );

        Ok(App {
            config,
            store,
            records,
            session,
            roster,
            llm,
        })
    }

    /// Replace the LLM client (used to point advice at a different endpoint).
    pub fn with_llm(mut self, llm: LlmClient) -> Self {
        self.llm = llm;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn records(&self) -> &[PlayRecord] {
        &self.records
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    fn save_session(&self) -> Result<()> {
        write_json(&self.config.session_path(), &self.session)
            .context("failed to save game session")
    }

    fn save_records(&self) -> Result<()> {
        self.store
            .save(&self.records)
            .context("failed to save play log")
    }

    /// Save the log and then the session after a commit or undo. If either
    /// write fails, `revert` undoes the in-memory log change, the session goes
    /// back to `before`, and the log file is rewritten so disk and memory
    /// agree again.
    fn persist_play_change<F>(&mut self, before: GameSession, revert: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<PlayRecord>),
    {
        let saved = self.save_records().and_then(|()| self.save_session());
        if let Err(e) = saved {
            revert(&mut self.records);
            self.session = before;
            if let Err(restore) = self.save_records() {
                warn!("failed to restore play log: {restore:#}");
            }
            return Err(e);
        }
        Ok(())
    }

    // --- Analysis ---

    /// Concrete scope for the current offense; falls back to the configured
    /// default when `kind` is `None`.
    pub fn scope(&self, kind: Option<ScopeKind>) -> Scope {
        kind.unwrap_or_else(|| self.config.analysis.scope_kind())
            .scope_for(self.session.situation.offense_team.as_deref())
    }

    /// Ranked strategies for the current situation.
    pub fn strategies(&self, kind: Option<ScopeKind>) -> Vec<StrategyStat> {
        let scope = self.scope(kind);
        let visible = filter_scope(&self.records, &scope);
        aggregate(&self.session.situation.fingerprint(), visible)
    }

    pub fn status(&self) -> String {
        let s = &self.session.situation;
        let mut out = String::new();

        let matchup = match (&s.offense_team, &s.defense_team) {
            (Some(off), Some(def)) => format!("{off} batting vs {def}"),
            (Some(off), None) => format!("{off} batting"),
            (None, Some(def)) => format!("{def} in the field"),
            (None, None) => "matchup not set".to_string(),
        };
        let _ = writeln!(out, "{}  [{}]", matchup, self.session.date);
        let _ = writeln!(out, "{}", describe_situation(s));
        let _ = writeln!(
            out,
            "Run expectancy: {:.3}",
            run_expectancy(s.outs, s.runners, s.count)
        );
        let _ = writeln!(out, "Situation key: {}", s.fingerprint());
        let scope = self.scope(None);
        match recommend(&s.fingerprint(), filter_scope(&self.records, &scope)) {
            Some(best) => {
                let _ = writeln!(
                    out,
                    "Recommended: {} (PEV {:+.3}, n={})",
                    best.action.label(),
                    best.avg_pev,
                    best.count
                );
            }
            None => {
                let _ = writeln!(out, "Recommended: no history yet");
            }
        }
        out.push('\n');
        out.push_str(&self.analyze(None));
        out
    }

    pub fn analyze(&self, kind: Option<ScopeKind>) -> String {
        let scope = self.scope(kind);
        let stats = self.strategies(kind);
        let mut out = String::new();
        let label = match &scope {
            Scope::All => "all teams".to_string(),
            Scope::Team(name) => name.clone(),
        };
        let _ = writeln!(
            out,
            "Strategies ({label}, {} samples):",
            total_samples(&stats)
        );
        out.push_str(&format_stats(&stats));
        out
    }

    /// Ask the LLM coach about the current situation. Streamed fragments go
    /// to `on_token`; the return value is the full reply or a fallback.
    pub async fn advise<F>(&self, kind: Option<ScopeKind>, on_token: F) -> String
    where
        F: FnMut(&str),
    {
        let stats = self.strategies(kind);
        let settings = AdviceSettings {
            team_name: self.config.team.name.clone(),
            language: self.config.llm.language.clone(),
            max_tokens: self.config.llm.max_tokens,
        };
        request_advice(&self.llm, &settings, &self.session.situation, &stats, on_token).await
    }

    // --- Situation editing ---

    pub fn update_situation(&mut self, update: SituationUpdate) -> Result<String> {
        if update.is_empty() {
            bail!("nothing to change; pass at least one field");
        }
        if let Some(inning) = update.inning {
            self.session.set_inning(inning)?;
        }
        if let Some(half) = update.half {
            self.session.set_half(half);
        }
        if let Some(outs) = update.outs {
            self.session.set_outs(outs)?;
        }
        if let Some(runners) = update.runners {
            self.session.set_runners(runners);
        }
        if let Some(score) = update.score {
            self.session.set_score(score);
        }
        if let Some(count) = update.count {
            self.session.set_count(count)?;
        }
        if let Some(date) = update.date {
            self.session.set_date(date);
        }
        self.save_session()?;
        Ok(describe_situation(&self.session.situation))
    }

    pub fn toggle_base(&mut self, base: u8) -> Result<String> {
        self.session.toggle_base(base)?;
        self.save_session()?;
        Ok(describe_situation(&self.session.situation))
    }

    pub fn next_inning(&mut self) -> Result<String> {
        self.session.next_inning();
        self.save_session()?;
        Ok(describe_situation(&self.session.situation))
    }

    pub fn set_opponent(&mut self, name: Option<&str>) -> Result<String> {
        let opponent = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) if n == self.config.team.name => bail!("{n} is our own team"),
            Some(n) if !self.roster.contains(n) => {
                bail!("unknown team {n:?}; register it with `waves teams add`")
            }
            Some(n) => Some(n.to_string()),
            None => None,
        };
        self.session.set_matchup(Matchup::new(
            &self.config.team.name,
            self.config.team.home,
            opponent,
        ));
        self.save_session()?;

        let m = &self.session.matchup;
        Ok(format!(
            "Visitor: {}\nHome: {}",
            m.visitor.as_deref().unwrap_or("-"),
            m.home.as_deref().unwrap_or("-"),
        ))
    }

    // --- Play lifecycle ---

    pub fn log_play(&mut self, result: PlayResult) -> Result<String> {
        let before = self.session.clone();
        let record = self.session.commit(result, &mut self.records)?;
        self.persist_play_change(before, |records| {
            records.pop();
        })?;

        Ok(format!(
            "Logged {} -> {}: PEV {:+.3} (RE {:.3} -> {:.3}, {} run(s))\nNext: {}",
            record.action.label(),
            record.result_type.label(),
            record.pev,
            record.current_re,
            record.next_re,
            record.runs_scored,
            describe_situation(&self.session.situation),
        ))
    }

    pub fn undo(&mut self) -> Result<String> {
        let before = self.session.clone();
        let Some(record) = self.session.undo(&mut self.records) else {
            return Ok("Nothing to undo.".to_string());
        };
        let removed = record.clone();
        self.persist_play_change(before, move |records| records.push(removed))?;
        Ok(format!(
            "Removed {} -> {} (PEV {:+.3})\nBack to: {}",
            record.action.label(),
            record.result_type.label(),
            record.pev,
            describe_situation(&self.session.situation),
        ))
    }

    // --- History transfer ---

    pub fn export(&self, dest: &Path) -> Result<String> {
        self.store.export_to(&self.records, dest)?;
        Ok(format!(
            "Exported {} plays to {}",
            self.records.len(),
            dest.display()
        ))
    }

    /// Replace the whole history with an exported file. Without `confirmed`
    /// the file is only checked and nothing changes.
    pub fn import(&mut self, src: &Path, confirmed: bool) -> Result<String> {
        if !confirmed {
            let incoming = LogStore::read_import(src)?;
            return Ok(format!(
                "{} holds {} plays. Importing replaces the current {} plays; \
                 rerun with --yes to proceed.",
                src.display(),
                incoming.len(),
                self.records.len(),
            ));
        }
        self.records = self.store.import_from(src)?;
        Ok(format!("Imported {} plays from {}", self.records.len(), src.display()))
    }

    // --- Teams ---

    pub fn list_teams(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Our team: {}", self.config.team.name);
        for name in self.roster.names() {
            let _ = writeln!(out, "  {name}");
        }
        out
    }

    pub fn add_team(&mut self, name: &str) -> Result<String> {
        let added = self.roster.add(name)?.to_string();
        self.roster
            .save(&self.config.teams_path())
            .context("failed to save team roster")?;
        Ok(format!("Added {added}"))
    }
}

// ---------------------------------------------------------------------------
// Direct engine queries
// ---------------------------------------------------------------------------

pub fn describe_run_expectancy(outs: u8, runners: RunnerState, count: Count) -> String {
    format!(
        "RE({outs} out, {}, {count}) = {:.3}",
        runners.code(),
        run_expectancy(outs, runners, count)
    )
}

/// PEV of one hypothetical play from a given before-state.
pub fn describe_pev(
    before: &Situation,
    outcome: Outcome,
    runs_scored: u32,
    after: AfterState,
) -> String {
    let before_re = run_expectancy(before.outs, before.runners, before.count);
    let value = pev(runs_scored, before_re, after, outcome);
    format!(
        "{}: PEV {:+.3} (before RE {:.3}, {} run(s), risk {:+.2})",
        outcome.label(),
        value,
        before_re,
        runs_scored,
        outcome.risk_adjustment(),
    )
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn describe_situation(s: &Situation) -> String {
    format!(
        "{} {} ({}), {}, {} out, {}, count {}",
        s.half,
        s.inning,
        s.zone().key(),
        s.score_diff.label(),
        s.outs,
        s.runners.describe(),
        s.count,
    )
}

fn format_stats(stats: &[StrategyStat]) -> String {
    if stats.is_empty() {
        return "  no plays logged in this situation yet\n".to_string();
    }
    let mut out = String::new();
    for (rank, s) in stats.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<16} PEV {:+.3}  success {:>3.0}%  pitches {:.1}  n={}",
            rank + 1,
            s.action.label(),
            s.avg_pev,
            s.success_rate * 100.0,
            s.avg_pitches,
            s.count,
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
