use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Detect;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Match }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Match => "match",
    }}
    fn span(&self) -> Span { match self {
        Phase::Match => info_span!("match"),
    }}
}

impl OpMarker for Detect {
    const NAME: &'static str = "detect";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("detect") }
}
