pub mod fire;
pub mod growth;
pub mod interact;
pub mod physics;
pub mod settings;
pub mod simulation;
pub mod structures;
pub mod worldgen;

pub use fire::BurningFire;
pub use growth::{GrowingPlant, PlantKind};
pub use interact::RayHit;
pub use physics::{Agent, AgentInput};
pub use settings::{SimulationSettings, TimerRange};
pub use simulation::{Simulation, SimulationSummary};
pub use worldgen::{generate_world, GenerateWorldConfig};
