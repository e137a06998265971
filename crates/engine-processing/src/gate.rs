use model::params::RunParams;
use tracing::info;

/// Verdict for one domain before its step starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Skip,
}

/// Decides per domain whether its step runs, based on the run's target
/// selector. A skipped domain leaves no counters behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionGate;

impl DecisionGate {
    pub fn decide(&self, params: &RunParams, domain: &str) -> GateDecision {
        if params.selects(domain) {
            GateDecision::Continue
        } else {
            info!(domain, targets = ?params.targets, "Domain not selected, skipping step");
            GateDecision::Skip
        }
    }
}
