pub mod advection;
pub mod climate;
pub mod config;
pub mod error;
pub mod grid;
pub mod landmask;
pub mod operators;
pub mod particles;
pub mod scheduler;
pub mod snapshot;
pub mod stepper;

pub use config::{
    LandPreset, ParticleSettings, PhysicsSettings, ScenarioConfig, SchedulerSettings, SimParams,
};
pub use error::{SimError, SimResult};
pub use grid::Grid;
pub use landmask::create_land_mask;
pub use particles::{ParticleSystem, sample_velocity};
pub use scheduler::FrameScheduler;
pub use snapshot::{FieldKind, RunSummary, save_field_png};
pub use stepper::{Simulation, StepStats};
