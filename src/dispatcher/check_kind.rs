use crate::rep_checker::{
    BinlogComparator, ErrorStatusEvaluator, Evaluator, MasterLogReporter, OtherChecksEvaluator,
    SlaveLogReporter, ThreadHealthEvaluator, TimeLagEvaluator,
};
use std::fmt;

/// Check identifiers accepted by the dispatcher. Declaration order is the
/// order individually requested checks are run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckKind {
    MasterLog,
    SlaveLogs,
    BinlogComparison,
    ThreadStatus,
    ErrorStatus,
    TimeLag,
    OtherChecks,
    /// Composite: expands to [`ALL_CHECKS`].
    All,
}

/// What `All` runs, in this order. The raw log reports are not part of it.
pub const ALL_CHECKS: [CheckKind; 5] = [
    CheckKind::BinlogComparison,
    CheckKind::ThreadStatus,
    CheckKind::ErrorStatus,
    CheckKind::TimeLag,
    CheckKind::OtherChecks,
];

impl CheckKind {
    /// The evaluator behind a concrete check; `None` for the composite.
    pub fn evaluator(self) -> Option<Box<dyn Evaluator>> {
        match self {
            CheckKind::MasterLog => Some(Box::new(MasterLogReporter)),
            CheckKind::SlaveLogs => Some(Box::new(SlaveLogReporter)),
            CheckKind::BinlogComparison => Some(Box::new(BinlogComparator)),
            CheckKind::ThreadStatus => Some(Box::new(ThreadHealthEvaluator)),
            CheckKind::ErrorStatus => Some(Box::new(ErrorStatusEvaluator)),
            CheckKind::TimeLag => Some(Box::new(TimeLagEvaluator)),
            CheckKind::OtherChecks => Some(Box::new(OtherChecksEvaluator)),
            CheckKind::All => None,
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::MasterLog => "MasterLog",
            CheckKind::SlaveLogs => "SlaveLogs",
            CheckKind::BinlogComparison => "CheckMasterLog",
            CheckKind::ThreadStatus => "CheckSlaveThread",
            CheckKind::ErrorStatus => "CheckSlaveError",
            CheckKind::TimeLag => "CheckSlaveTime",
            CheckKind::OtherChecks => "CheckSlaveOther",
            CheckKind::All => "All",
        };
        write!(f, "{}", name)
    }
}
