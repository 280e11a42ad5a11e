pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod foods;
pub mod import;
pub mod state;
pub mod telemetry;
