pub mod config;
pub mod error;
pub mod feasibility;
pub mod io;
pub mod paths;
pub mod patterns;
pub mod planner;
pub mod project;
pub mod publish;
pub mod stack;
pub mod summary;
pub mod template;
pub mod triage;

pub use error::{PlanError, Result};
