//! One orchestrator per capability. Each owns a fixed provider chain and
//! decides what happens when that chain is exhausted.

pub mod assistant;
pub mod places;
pub mod translate;
