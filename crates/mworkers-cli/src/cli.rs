use clap::{ArgAction, Parser};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "mworkers")]
#[command(about = "mworkers - queue closed files in a directory for a pool of worker threads")]
#[command(version)]
pub struct Cli {
    /// Increase diagnostic output (-v shows queued/claimed lines, -vv traces)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Number of worker threads (defaults to 2)
    #[arg(short = 'n', long = "workers", value_name = "NUM", env = "MWORKERS_WORKERS")]
    pub workers: Option<NonZeroUsize>,

    /// Directory to watch (defaults to /tmp)
    #[arg(short = 'd', long = "dir", value_name = "DIR", env = "MWORKERS_DIR")]
    pub dir: Option<PathBuf>,

    /// Config file path (TOML with a [pipeline] table)
    #[arg(short = 'C', long, value_name = "FILE", env = "MWORKERS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bound the work queue; producers block while it is full
    #[arg(long, value_name = "NUM")]
    pub queue_capacity: Option<NonZeroUsize>,

    /// Placeholder task delay in milliseconds
    #[arg(long, value_name = "MS")]
    pub task_delay_ms: Option<u64>,

    /// React to every close, not only closes after writing
    #[arg(long)]
    pub all_closes: bool,

    /// After the notification stream ends, let workers finish queued items
    #[arg(long)]
    pub drain: bool,
}

impl Cli {
    /// Log level implied by the `-v` count.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mworkers"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.workers.is_none());
        assert!(cli.dir.is_none());
        assert_eq!(cli.log_level(), LevelFilter::WARN);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["mworkers", "-vv", "-n", "4", "-d", "/srv/in"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.workers.map(NonZeroUsize::get), Some(4));
        assert_eq!(cli.dir, Some(PathBuf::from("/srv/in")));
        assert_eq!(cli.log_level(), LevelFilter::TRACE);
    }

    #[test]
    fn test_single_verbose_is_debug() {
        let cli = Cli::try_parse_from(["mworkers", "-v"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Cli::try_parse_from(["mworkers", "-n", "0"]).is_err());
    }

    #[test]
    fn test_non_numeric_workers_rejected() {
        assert!(Cli::try_parse_from(["mworkers", "-n", "many"]).is_err());
    }

    #[test]
    fn test_positional_argument_rejected() {
        assert!(Cli::try_parse_from(["mworkers", "/tmp/other"]).is_err());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["mworkers", "-x"]).is_err());
    }
}
