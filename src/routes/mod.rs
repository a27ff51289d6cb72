pub mod health;
pub mod proxy;

pub use proxy::{Upstream, forward};
