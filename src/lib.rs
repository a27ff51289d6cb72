use config::Config;
use routes::Upstream;
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod middleware;
pub mod result;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: Arc<Upstream>,
}
