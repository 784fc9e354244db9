//! The simulation engine - propagation, pathfinding, agents, control
//!
//! Round shape: agents act -> hazards spread -> flashover -> caught agents
//! reset -> portraits replenish -> status re-evaluated.

pub mod agent;
pub mod constants;
pub mod controller;
pub mod events;
pub mod flashover;
pub mod pathfinding;
pub mod propagation;

// Re-exports for convenient access
pub use agent::{Agent, Role};
pub use constants::*;
pub use controller::{DefeatReason, Simulation, SimulationStatus};
pub use events::{Event, EventKind, EventLog};
pub use flashover::advance_flashover;
pub use pathfinding::plan_route;
pub use propagation::{advance_hazards, explode};
