//! Clap argument definitions for the `xtf` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use xtf_config::SortGroupsBy;

/// Parse a group ordering from its configuration name.
fn parse_sort(s: &str) -> Result<SortGroupsBy, String> {
    s.parse()
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "xtf")]
#[command(about = "Faceted search over hierarchical and FRBR-grouped collections")]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared flag locating the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file [default: ./xtf.toml if present]
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `xtf load`.
#[derive(Args, Debug, Clone)]
pub struct LoadCommand {
    /// Directory to create the index in
    #[arg(short = 'i', long)]
    pub index: PathBuf,

    /// Fields to tokenize for full-text search (can be specified multiple times) [default: text]
    #[arg(short = 't', long = "text-field")]
    pub text_fields: Vec<String>,

    /// JSON lines file, one document object per line
    pub file: PathBuf,
}

/// Arguments for `xtf facet`.
#[derive(Args, Debug, Clone)]
pub struct FacetCommand {
    /// Query to run; `*` matches every document
    #[arg(default_value = "*")]
    pub query: String,

    #[command(flatten)]
    /// Configuration file location.
    pub config: ConfigArgs,

    /// Index directory [default: from configuration]
    #[arg(short = 'i', long)]
    pub index: Option<PathBuf>,

    /// Facet field to compute instead of the configured facets (can be specified multiple times)
    #[arg(short = 'f', long = "facet")]
    pub facets: Vec<String>,

    /// Selection expression overriding the facet's configured one
    #[arg(short = 's', long)]
    pub select: Option<String>,

    /// Sibling ordering: value, reverseValue, totalDocs or maxDocScore
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortGroupsBy>,

    /// Show groups without matching documents
    #[arg(long)]
    pub include_empty: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `xtf check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    #[command(flatten)]
    /// Configuration file location.
    pub config: ConfigArgs,
}

/// Supported `xtf` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a JSON lines file
    #[command(after_help = "\
FIELD TYPES:
  String and string-array values become untokenized fields, so
  hierarchical values such as \"Fiction::Mystery\" stay intact for
  faceting. Fields named with --text-field are tokenized instead and are
  what queries search by default.")]
    Load(LoadCommand),

    /// Run a query and print its facets
    #[command(after_help = "\
SELECTION SYNTAX:
  *                 Every non-empty child
  **                Every non-empty descendant
  Fiction::*        Children of a named group
  *[1-5]            First five children of each parent
  *[siblings]       Expand matches to all their siblings
  **[topChoices]    Children of the shallowest branching group
  *#1-10            Attach the top ten hits to each selected group
  *#all             Attach every hit
  a | b             Union of two selections

DYNAMIC FACETS:
  dynamic:frbr(title author date [sort=title])
                    Cluster matching records into works")]
    Facet(FacetCommand),

    /// Validate configuration and report issues
    Check(CheckCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn facet_defaults() {
        let cli = Cli::parse_from(["xtf", "facet"]);
        let Commands::Facet(cmd) = cli.command else {
            panic!("expected facet command");
        };
        assert_eq!(cmd.query, "*");
        assert!(cmd.facets.is_empty());
        assert!(cmd.sort.is_none());
        assert!(!cmd.json);
    }

    #[test]
    fn facet_overrides() {
        let cli = Cli::parse_from([
            "xtf", "-vv", "facet", "-f", "subject", "--select", "*[1-3]", "--sort", "value",
            "whale",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Facet(cmd) = cli.command else {
            panic!("expected facet command");
        };
        assert_eq!(cmd.facets, vec!["subject"]);
        assert_eq!(cmd.select.as_deref(), Some("*[1-3]"));
        assert_eq!(cmd.sort, Some(SortGroupsBy::Value));
        assert_eq!(cmd.query, "whale");
    }

    #[test]
    fn unknown_sort_rejected() {
        let result = Cli::try_parse_from(["xtf", "facet", "--sort", "count"]);
        assert!(result.is_err());
    }
}
