pub mod terraform;

pub use terraform::TerraformPlanner;
