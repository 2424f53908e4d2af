use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};
use snipbox_core::api::Selection;

#[derive(Parser, Debug)]
#[command(name = "snipbox", version, about = "Run language-feature snippets in isolation")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.snipbox/config.toml or ./.snipbox.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute snippets and print a report.
    Run(RunArgs),
    /// Print the snippet catalog.
    List(ListArgs),
}

/// Snippets in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// One per CPU.
    Auto,
    Fixed(usize),
}

impl FromStr for Parallelism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match s.parse::<usize>() {
            Ok(0) => Ok(Self::Auto),
            Ok(n) => Ok(Self::Fixed(n)),
            Err(_) => Err(format!("expected a number or `auto`, got `{s}`")),
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["all", "category", "id"])
))]
pub struct RunArgs {
    /// Run every snippet in the catalog.
    #[arg(long)]
    pub all: bool,

    /// Run one category (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Run specific snippets, in the order given. Can be specified multiple times.
    #[arg(long = "id", action = clap::ArgAction::Append)]
    pub id: Vec<String>,

    /// Report format: text or json.
    #[arg(long)]
    pub format: Option<String>,

    /// Per-snippet time budget in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Snippets in flight at once: a number or `auto`.
    #[arg(long)]
    pub parallel: Option<Parallelism>,

    /// Snippet tree or manifest directory.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Write the report to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// ASCII-only status markers.
    #[arg(long)]
    pub ascii: bool,

    /// Pretty-print the json report.
    #[arg(long)]
    pub pretty: bool,

    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    pub fn selection(&self) -> Selection {
        if self.all {
            Selection::All
        } else if let Some(category) = &self.category {
            Selection::Category(category.clone())
        } else {
            Selection::Ids(self.id.clone())
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Only list one category (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Output format: text or json.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Snippet tree or manifest directory.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("snipbox").chain(argv.iter().copied()))
    }

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn run_requires_exactly_one_selection() {
        assert!(parse(&["run"]).is_err());
        assert!(parse(&["run", "--all", "--category", "Maps"]).is_err());

        let args = parse(&["run", "--id", "a", "--id", "b", "--config", "x.toml"]).unwrap();
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("x.toml")));
        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.selection(), Selection::Ids(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn run_flags_parse() {
        let args = parse(&[
            "run",
            "--category",
            "maps",
            "--format",
            "json",
            "--timeout-ms",
            "250",
            "--parallel",
            "auto",
            "--pretty",
            "--no-progress",
        ])
        .unwrap();
        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.selection(), Selection::Category("maps".into()));
        assert_eq!(run.format.as_deref(), Some("json"));
        assert_eq!(run.timeout_ms, Some(250));
        assert_eq!(run.parallel, Some(Parallelism::Auto));
        assert!(run.pretty && run.no_progress && !run.ascii);
    }

    #[test]
    fn parallelism_values() {
        assert_eq!("4".parse::<Parallelism>(), Ok(Parallelism::Fixed(4)));
        assert_eq!("AUTO".parse::<Parallelism>(), Ok(Parallelism::Auto));
        assert_eq!("0".parse::<Parallelism>(), Ok(Parallelism::Auto));
        assert!("many".parse::<Parallelism>().is_err());
        assert!(parse(&["run", "--all", "--parallel", "many"]).is_err());
    }

    #[test]
    fn list_defaults_to_text() {
        let args = parse(&["list"]).unwrap();
        let Commands::List(list) = args.command else {
            panic!("expected list");
        };
        assert_eq!(list.format, "text");
        assert!(list.category.is_none());
    }
}
