pub mod app_state;
pub mod config;
pub mod result_store;
pub mod types;

pub use app_state::AppState;
