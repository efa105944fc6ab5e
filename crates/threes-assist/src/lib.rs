pub mod assistant;
pub mod io;
pub mod oracle;

pub use assistant::{
    Action, Assistant, AssistantConfig, AssistantError, GameOverReason, Phase, RunMode,
    RunOutcome, RunStats, run,
};
pub use io::{BoardSensor, MoveActuator, Observation};
pub use oracle::{DirectionScore, MoveOracle, OracleSnapshot, best_direction, score_directions};
