pub mod app;
pub mod config;
pub mod db;
pub mod goals;
pub mod meals;
pub mod progress;
pub mod state;
pub mod store;
pub mod vision;
pub mod webhook;
