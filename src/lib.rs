pub mod analytics;
pub mod app;
pub mod commands;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod resources;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod streak;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
