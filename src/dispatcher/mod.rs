pub mod check_dispatcher;
pub mod check_kind;
pub mod report;

pub use check_dispatcher::CheckDispatcher;
pub use check_kind::CheckKind;
pub use report::Report;
