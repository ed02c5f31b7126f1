// Data Analyst Agent - ask questions about uploaded documents

pub mod agents;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
