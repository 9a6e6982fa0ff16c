mod simulation;

pub use simulation::{SimState, Simulation, Status};
