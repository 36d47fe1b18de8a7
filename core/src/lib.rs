//! plancheck core: decide whether a failed plan is an environment gap or a real defect.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod outcome;
pub mod planner;
pub mod report;
