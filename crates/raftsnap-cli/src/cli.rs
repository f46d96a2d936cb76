use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "raftsnap",
    about = "Raft snapshot inspector: verify an archive and summarize its key space",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify a snapshot archive and report on its contents
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// Snapshot archive (gzip-compressed tar)
    pub file: PathBuf,

    /// Break down record counts by key prefix
    #[arg(long)]
    pub kvdetails: bool,

    /// Key prefix depth used for the breakdown [default: 2]
    #[arg(long, value_name = "DEPTH")]
    pub kvdepth: Option<usize>,

    /// Only count keys starting with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub kvfilter: Option<String>,

    /// TOML file with inspection settings; flags take precedence
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspect(cli: Cli) -> InspectArgs {
        match cli.command {
            Command::Inspect(args) => args,
        }
    }

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["raftsnap", "inspect", "backup.snap"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        let args = inspect(cli);
        assert_eq!(args.file, PathBuf::from("backup.snap"));
        assert!(!args.kvdetails);
        assert_eq!(args.kvdepth, None);
        assert_eq!(args.kvfilter, None);
    }

    #[test]
    fn parse_kv_flags() {
        let cli = Cli::try_parse_from([
            "raftsnap",
            "inspect",
            "--kvdetails",
            "--kvdepth",
            "3",
            "--kvfilter",
            "logical/",
            "backup.snap",
        ])
        .unwrap();
        let args = inspect(cli);
        assert!(args.kvdetails);
        assert_eq!(args.kvdepth, Some(3));
        assert_eq!(args.kvfilter.as_deref(), Some("logical/"));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["raftsnap", "inspect", "x.snap", "--format", "json", "-v"])
                .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = Cli::try_parse_from(["raftsnap", "inspect"]).err().unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn extra_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["raftsnap", "inspect", "a.snap", "b.snap"])
            .err()
            .unwrap();
        assert!(err.use_stderr());
    }

    #[test]
    fn non_numeric_depth_is_a_usage_error() {
        assert!(Cli::try_parse_from(["raftsnap", "inspect", "--kvdepth", "deep", "a.snap"]).is_err());
    }

    #[test]
    fn help_is_not_a_failure() {
        let err = Cli::try_parse_from(["raftsnap", "--help"]).err().unwrap();
        assert!(!err.use_stderr());
    }
}
