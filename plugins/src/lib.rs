pub mod factory;
pub mod planner;
