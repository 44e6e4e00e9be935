use crate::dispatcher::check_kind::{ALL_CHECKS, CheckKind};
use crate::dispatcher::report::Report;
use crate::rep_checker::Topology;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Runs the requested checks against one topology and assembles the report.
pub struct CheckDispatcher {
    topology: Topology,
}

impl CheckDispatcher {
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    /// The checks a request expands to, in run order and without duplicates.
    pub fn plan(requested: &[CheckKind]) -> Vec<CheckKind> {
        if requested.contains(&CheckKind::All) {
            let mut plan = ALL_CHECKS.to_vec();
            for kind in requested {
                if *kind != CheckKind::All && !plan.contains(kind) {
                    plan.push(*kind);
                }
            }
            return plan;
        }
        requested
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Evaluators run one after the other; replicas inside each run
    /// concurrently. Returns `None` when `lag_only` is set and no lag was found.
    pub async fn run(&self, requested: &[CheckKind], lag_only: bool) -> Option<Report> {
        let mut report = Report::new(self.topology.primary_name().map(str::to_string));

        for kind in Self::plan(requested) {
            let Some(evaluator) = kind.evaluator() else {
                continue;
            };
            debug!(check = %kind, "Running check");
            let result = evaluator.evaluate(&self.topology).await;
            let failures = result.failure_count();
            if failures > 0 {
                info!(check = %kind, failures, "Check finished with failed slaves");
            }
            report.checks.push(result);
        }

        if lag_only && !report.has_time_lag() {
            info!("No slave lag detected, suppressing report");
            return None;
        }
        Some(report)
    }
}
