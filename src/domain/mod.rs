//! Domain model: records, the fine state machine, and the store ports.

pub mod command;
pub mod driver;
pub mod events;
pub mod fine;
pub mod ids;
pub mod ports;
pub mod resolution;
