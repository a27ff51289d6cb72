pub mod admission;
mod auth;
mod error_handler;
mod rate_limit;

pub use admission::{API_PREFIX, AdmissionController, Decision, admission, is_excluded_path};
pub use auth::{PageAccess, session_cookie};
pub use error_handler::log_errors;
pub use rate_limit::{ANONYMOUS, client_identifier, fingerprint, spawn_sweeper};
