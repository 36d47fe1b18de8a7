mod run;

pub use run::PlanOrchestrator;
