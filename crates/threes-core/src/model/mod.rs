pub mod board;
pub mod direction;
pub mod rank;
pub mod tileset;
