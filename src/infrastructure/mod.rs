pub mod artifacts;
pub mod backends;
pub mod store;
