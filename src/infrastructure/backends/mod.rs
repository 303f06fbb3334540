mod cloud_build;
mod generator;

pub use cloud_build::*;
pub use generator::*;
