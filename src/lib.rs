//! Hearthstead - headless settlement economy simulation

pub mod agent;
pub mod core;
pub mod economy;
pub mod map;
pub mod pathfind;
pub mod simulation;
pub mod task;
