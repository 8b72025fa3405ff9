pub mod application;
pub mod config;
pub mod deployment;
pub mod error;
pub mod events;
pub mod model;
pub mod repository;
pub mod telemetry;
