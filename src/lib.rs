pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod range;
pub mod startup;
pub mod state;
