pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

pub fn rip() -> LogCtx<ops::rip::Rip> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn detect() -> LogCtx<ops::detect::Detect> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
