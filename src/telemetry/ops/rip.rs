use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Rip;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Detect, Load, Extract, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Detect => "detect",
        Phase::Load => "load",
        Phase::Extract => "extract",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::Detect => info_span!("detect"),
        Phase::Load => info_span!("load"),
        Phase::Extract => info_span!("extract"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Rip {
    const NAME: &'static str = "rip";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("rip") }
}
