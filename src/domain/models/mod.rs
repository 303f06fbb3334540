mod action;
mod app;
mod backend;
mod build_job;
mod error;
mod event;
mod export;
mod generation;
mod message;
mod onboarding;
mod slash_commands;

pub use action::*;
pub use app::*;
pub use backend::*;
pub use build_job::*;
pub use error::*;
pub use event::*;
pub use export::*;
pub use generation::*;
pub use message::*;
pub use onboarding::*;
pub use slash_commands::*;
