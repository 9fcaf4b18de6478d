mod tasks;

pub use tasks::simulated_discovery_task;
