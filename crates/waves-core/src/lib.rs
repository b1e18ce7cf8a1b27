// Run-expectancy and strategy evaluation engine.
//
// Everything in this crate is pure: the tables are constants, every function
// reads only its arguments, and the play history is consumed as a borrowed
// snapshot owned by the caller.

pub mod outcome;
pub mod pev;
pub mod record;
pub mod run_expectancy;
pub mod situation;
pub mod strategy;

pub use outcome::{Action, Outcome, PlatePhase};
pub use pev::{after_run_expectancy, pev, AfterState};
pub use record::{PlayRecord, PlayResult};
pub use run_expectancy::run_expectancy;
pub use situation::{Count, Half, InningZone, ParseEnumError, RunnerState, ScoreDiff, Situation};
pub use strategy::{aggregate, filter_scope, recommend, total_samples, Scope, StrategyStat};
