use crate::dispatcher::CheckKind;
use crate::report_writer::report_writer::OutputFormat;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "MySQL replication status checker")]
#[command(group(
    ArgGroup::new("checks")
        .required(true)
        .multiple(true)
        .args(["all", "master_log", "compare_logs", "slave_logs", "errors", "other", "threads", "time_lag"])
))]
pub struct Args {
    #[arg(long, short, default_value = "inventory.repadmin.yml")]
    pub inventory: String,

    /// Run every check: -C -S -E -T -O
    #[arg(short = 'A', long = "all")]
    pub all: bool,

    /// Report the master's binlog position
    #[arg(short = 'B', long = "master-log")]
    pub master_log: bool,

    /// Compare slave log positions with the master's
    #[arg(short = 'C', long = "compare-logs")]
    pub compare_logs: bool,

    /// Report every slave's read and relay log positions
    #[arg(short = 'D', long = "slave-logs")]
    pub slave_logs: bool,

    /// Check slave IO and SQL errors
    #[arg(short = 'E', long = "errors")]
    pub errors: bool,

    /// Check skip counter, temp tables and retried transactions
    #[arg(short = 'O', long = "other")]
    pub other: bool,

    /// Check slave IO and SQL threads
    #[arg(short = 'S', long = "threads")]
    pub threads: bool,

    /// Check slave lag
    #[arg(short = 'T', long = "time-lag")]
    pub time_lag: bool,

    /// Only emit a report when slave lag was found
    #[arg(
        short = 'x',
        long = "lag-only",
        requires = "time_lag",
        conflicts_with_all = ["all", "master_log", "compare_logs", "slave_logs", "errors", "other", "threads"]
    )]
    pub lag_only: bool,

    /// Do not print the report to stdout
    #[arg(short = 'z', long = "no-stdout")]
    pub no_stdout: bool,

    /// Pretty-print JSON
    #[arg(short = 'e', long = "expand")]
    pub expand: bool,

    /// Also write the report to this file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Append to the output file instead of replacing it
    #[arg(short = 'a', long = "append", requires = "output")]
    pub append: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Seconds to wait before re-reading a non-zero slave lag
    #[arg(long = "confirm-delay")]
    pub confirm_delay: Option<u64>,

    /// Seconds after which unfinished slave checks are marked incomplete
    #[arg(long = "deadline")]
    pub deadline: Option<u64>,

    /// Maximum number of slaves checked at the same time
    #[arg(long = "max-concurrency")]
    pub max_concurrency: Option<usize>,
}

impl Args {
    pub fn requested_checks(&self) -> Vec<CheckKind> {
        [
            (self.all, CheckKind::All),
            (self.master_log, CheckKind::MasterLog),
            (self.slave_logs, CheckKind::SlaveLogs),
            (self.compare_logs, CheckKind::BinlogComparison),
            (self.threads, CheckKind::ThreadStatus),
            (self.errors, CheckKind::ErrorStatus),
            (self.time_lag, CheckKind::TimeLag),
            (self.other, CheckKind::OtherChecks),
        ]
        .into_iter()
        .filter_map(|(requested, kind)| requested.then_some(kind))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_checks() {
        let args = Args::try_parse_from(["repadmin", "-A", "-B", "-i", "inv.yml"]).unwrap();
        assert_eq!(args.inventory, "inv.yml");
        assert_eq!(args.requested_checks(), vec![CheckKind::All, CheckKind::MasterLog]);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_a_check_is_required() {
        assert!(Args::try_parse_from(["repadmin"]).is_err());
        assert!(Args::try_parse_from(["repadmin", "-e"]).is_err());
    }

    #[test]
    fn test_lag_only_needs_time_lag_alone() {
        assert!(Args::try_parse_from(["repadmin", "-T", "-x"]).is_ok());
        assert!(Args::try_parse_from(["repadmin", "-S", "-x"]).is_err());
        assert!(Args::try_parse_from(["repadmin", "-T", "-S", "-x"]).is_err());
    }

    #[test]
    fn test_append_needs_output_file() {
        assert!(Args::try_parse_from(["repadmin", "-T", "-a"]).is_err());
        let args =
            Args::try_parse_from(["repadmin", "-T", "-a", "-o", "out.json", "--format", "table"])
                .unwrap();
        assert!(args.append);
        assert_eq!(args.format, OutputFormat::Table);
    }
}
