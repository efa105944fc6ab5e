//! Seeded benchmark harness for the Threes assistant: drives full
//! simulated games through the sensor/actuator seams and reports
//! score statistics per run.

pub mod agents;
pub mod analytics;
pub mod config;
pub mod harness;
pub mod logging;
