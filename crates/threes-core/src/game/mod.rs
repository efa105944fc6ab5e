//! Self-played games: a seeded dealer with the full hidden state, and a
//! compact seed-plus-moves record that reproduces any game exactly.

mod replay;
mod session;

pub use replay::{RecordedGame, ReplayError, ReplayOutcome};
pub use session::{GameSession, MoveRecord};
