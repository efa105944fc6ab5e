use threes_core::model::board::Board;
use threes_core::model::direction::Direction;
use threes_core::model::tileset::TileSet;

/// One frame captured from the running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub board: Board,
    /// The announced next tileset, when the capture pipeline can read it.
    pub upcoming: Option<TileSet>,
    /// True when the frame shows the game's own end screen instead of a
    /// playable position.
    pub terminal: bool,
    /// True for informational frames where no move should be played.
    pub skip_decision: bool,
}

impl Observation {
    pub fn new(board: Board) -> Self {
        Observation {
            board,
            upcoming: None,
            terminal: false,
            skip_decision: false,
        }
    }

    pub fn with_upcoming(mut self, upcoming: TileSet) -> Self {
        self.upcoming = Some(upcoming);
        self
    }

    pub fn marking_terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn skipping_decision(mut self) -> Self {
        self.skip_decision = true;
        self
    }
}

/// Source of game frames: a screen grabber, a memory reader, or a simulator.
/// Blocks until the next frame is available.
pub trait BoardSensor {
    fn observe(&mut self) -> Observation;
}

/// Sink for chosen moves: input injection on a device, or a simulator.
pub trait MoveActuator {
    fn perform(&mut self, direction: Direction);
}
