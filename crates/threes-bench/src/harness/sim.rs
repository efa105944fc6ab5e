use std::cell::RefCell;
use std::rc::Rc;

use threes_assist::io::{BoardSensor, MoveActuator, Observation};
use threes_core::game::GameSession;
use threes_core::model::direction::Direction;

/// Splits a shared simulated game into the sensor/actuator pair the
/// assistant driver expects.
pub fn session_pair(session: &Rc<RefCell<GameSession>>) -> (SessionSensor, SessionActuator) {
    (
        SessionSensor {
            session: Rc::clone(session),
        },
        SessionActuator {
            session: Rc::clone(session),
        },
    )
}

/// Frames come straight from the simulated game, announcement included. A
/// dead board is reported as terminal, the way a capture pipeline reports
/// the end screen.
pub struct SessionSensor {
    session: Rc<RefCell<GameSession>>,
}

impl BoardSensor for SessionSensor {
    fn observe(&mut self) -> Observation {
        let session = self.session.borrow();
        let observation = Observation::new(session.board()).with_upcoming(session.upcoming());
        if session.is_over() {
            observation.marking_terminal()
        } else {
            observation
        }
    }
}

/// Chosen directions feed back into the same simulated game.
pub struct SessionActuator {
    session: Rc<RefCell<GameSession>>,
}

impl MoveActuator for SessionActuator {
    fn perform(&mut self, direction: Direction) {
        // An input on a finished or mismatched board is dropped, the way a
        // real game ignores a swipe it cannot apply.
        let _ = self.session.borrow_mut().advance(direction);
    }
}
