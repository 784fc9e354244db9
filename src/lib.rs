//! Mansion Rescue - turn-based rescue-and-firefighting simulation engine
//!
//! Teams of rescuers and firefighters search a burning mansion for victims
//! among false alarms while fire spreads, walls take damage, and the clock
//! of casualties runs. The crate is the engine only: it takes a board
//! configuration value, advances one round per [`sim::Simulation::step`]
//! call, and emits an append-only event log for external consumers.

pub mod core;
pub mod mansion;
pub mod sim;
