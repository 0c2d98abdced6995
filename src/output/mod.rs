pub mod config;
pub mod presenter;

pub use config::OutputConfig;
pub use presenter::Emitter;
