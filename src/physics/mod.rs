//! 跟随物理
//!
//! 每帧流程：积分（Spring-Verlet）→ 距离约束投影 → 推进历史

mod config;
mod integrator;
mod constraint;
mod simulation;

pub use config::SimulationParams;
pub use integrator::{integrate, spring_acceleration};
pub use constraint::{project, DistanceConstraint};
pub use simulation::{run, ChainSimulation};
