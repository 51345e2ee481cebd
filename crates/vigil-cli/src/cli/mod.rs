use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vigil` binary.
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about = "vigil - run operator-authored data checks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ./vigil.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Checks root (overrides `checks.root`)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Data snapshot (overrides `data.snapshot`)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
            root: self.root.clone(),
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::root_commands::SchemaType;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["vigil", "--format", "json", "--verbose", "list"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List(ref args) if !args.errors));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vigil", "list", "--errors", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::List(ref args) if args.errors));
    }

    #[test]
    fn run_requires_a_target() {
        assert!(Cli::try_parse_from(["vigil", "run"]).is_err());

        let cli = Cli::try_parse_from(["vigil", "run", "net", "dcim.sites.SiteReport"])
            .expect("cli should parse");
        match cli.command {
            Commands::Run(args) => assert_eq!(args.targets, ["net", "dcim.sites.SiteReport"]),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn schema_defaults_to_result() {
        let cli = Cli::try_parse_from(["vigil", "schema"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::Schema(ref args) if args.type_name == SchemaType::Result));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["vigil", "--format", "xml", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_paths() {
        let cli = Cli::try_parse_from([
            "vigil",
            "--root",
            "/srv/checks",
            "--data",
            "/srv/data.json",
            "show",
            "net.CablingReport",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.root.as_deref(), Some(Path::new("/srv/checks")));
        assert_eq!(flags.data.as_deref(), Some(Path::new("/srv/data.json")));
        assert!(flags.config.is_none());
    }
}
