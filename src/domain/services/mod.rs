pub mod actions;
mod build_poller;
mod builder;
pub mod exporters;
pub mod frames;
pub mod merge;
mod onboarding;
mod persistence;

pub use build_poller::*;
pub use builder::*;
pub use onboarding::*;
pub use persistence::*;
