pub mod rip;
pub mod detect;
