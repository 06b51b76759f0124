//! CLI surface for cattree.
//!
//! Each command loads the store once, acts through a [`TreeView`], and
//! prints either a human rendering or JSON. Flag spelling is tolerant
//! (case, underscores and a few aliases) so scripts do not have to be exact.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, builder::BoolishValueParser};
use serde::Serialize;

use crate::config::{self, Config};
use crate::core::CategoryId;
use crate::mutate::TreeMutator;
use crate::store::FileStore;
use crate::view::TreeView;
use crate::{Error, Result};

mod commands;
mod render;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "cattree",
    version,
    about = "Manage the catalog category tree",
    infer_subcommands = true,
    infer_long_args = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Machine-readable JSON output.
    #[arg(
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    /// Category snapshot file (default: from config, then the data dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Errors only.
    #[arg(
        short = 'q',
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed the reserved fallback category into an empty store.
    Init,

    /// Print the category tree.
    #[command(alias = "ls")]
    Tree(TreeArgs),

    /// Show one category.
    Show(ShowArgs),

    /// Create a category.
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Rename a category.
    Rename(RenameArgs),

    /// Move a category under another parent or to the root level.
    #[command(alias = "mv")]
    Move(MoveArgs),

    /// Delete a category and its sub-categories.
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Create several sibling categories, one name per line.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Only show categories matching this text (and their ancestors).
    #[arg(value_name = "QUERY", num_args = 0..)]
    pub query: Vec<String>,

    /// Collapse these categories.
    #[arg(long, value_name = "ID", num_args = 1.., value_parser = parse_id)]
    pub collapse: Vec<CategoryId>,

    /// Show only root categories.
    #[arg(long, default_value_t = false)]
    pub collapse_all: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_parser = parse_id)]
    pub id: CategoryId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub name: String,

    /// Parent category (default: root level).
    #[arg(long, value_name = "ID", value_parser = parse_id)]
    pub parent: Option<CategoryId>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// English display name.
    #[arg(long, value_name = "NAME")]
    pub nom_en: Option<String>,

    /// Arabic display name.
    #[arg(long, value_name = "NAME")]
    pub nom_ar: Option<String>,

    /// Chinese display name.
    #[arg(long, value_name = "NAME")]
    pub nom_zh: Option<String>,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    #[arg(value_parser = parse_id)]
    pub id: CategoryId,

    pub name: String,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("destination").required(true).args(["parent", "root"])))]
pub struct MoveArgs {
    #[arg(value_parser = parse_id)]
    pub id: CategoryId,

    /// New parent category.
    #[arg(long, value_name = "ID", value_parser = parse_id)]
    pub parent: Option<CategoryId>,

    /// Move to the root level.
    #[arg(long, default_value_t = false)]
    pub root: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(value_parser = parse_id)]
    pub id: CategoryId,

    /// Skip the confirmation prompt.
    #[arg(
        long,
        short = 'y',
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Parent for every created category (default: root level).
    #[arg(long, value_name = "ID", value_parser = parse_id)]
    pub parent: Option<CategoryId>,

    /// Read names from this file instead of stdin.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let raw: Vec<OsString> = args.into_iter().map(|t| t.into()).collect();
    Cli::parse_from(normalize_args(raw))
}

pub fn run(cli: Cli) -> Result<()> {
    let config = config::load_or_init();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let ctx = Ctx::open(&config, cli.store, cli.json, cli.quiet);
    runtime.block_on(dispatch(ctx, cli.command))
}

async fn dispatch(mut ctx: Ctx, command: Commands) -> Result<()> {
    ctx.view.refresh().await?;
    match command {
        Commands::Init => commands::init::handle(&mut ctx).await,
        Commands::Tree(args) => commands::tree::handle(&mut ctx, args),
        Commands::Show(args) => commands::show::handle(&ctx, args),
        Commands::Create(args) => commands::create::handle(&mut ctx, args).await,
        Commands::Rename(args) => commands::rename::handle(&mut ctx, args).await,
        Commands::Move(args) => commands::move_::handle(&mut ctx, args).await,
        Commands::Delete(args) => commands::delete::handle(&mut ctx, args).await,
        Commands::Batch(args) => commands::batch::handle(&mut ctx, args).await,
    }
}

// =============================================================================
// Shared handler plumbing
// =============================================================================

struct Ctx {
    json: bool,
    quiet: bool,
    view: TreeView<FileStore>,
}

impl Ctx {
    fn open(config: &Config, store: Option<PathBuf>, json: bool, quiet: bool) -> Self {
        let path = store.unwrap_or_else(|| config.store.resolved_path());
        tracing::debug!(store = %path.display(), "opening category store");
        let mutator = TreeMutator::with_policy(FileStore::new(path), config.tree.policy());
        Self {
            json,
            quiet,
            view: TreeView::new(mutator),
        }
    }

    /// Human output unless `--json` or `--quiet`.
    fn say(&self, text: &str) -> Result<()> {
        if self.json || self.quiet {
            return Ok(());
        }
        print_line(text)
    }

    /// Print `payload` as JSON when `--json`, otherwise the human rendering.
    fn emit<T: Serialize>(&self, payload: &T, human: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            return print_json(payload);
        }
        self.say(&human())
    }
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(payload).map_err(std::io::Error::from)?;
    print_line(&s)
}

fn print_line(s: &str) -> Result<()> {
    use std::io::Write;
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{s}")
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(Error::Io(e));
    }
    Ok(())
}

fn normalize_args(mut raw: Vec<OsString>) -> Vec<OsString> {
    if raw.is_empty() {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len());
    out.push(raw.remove(0)); // program name

    let mut passthrough = false;
    for arg in raw {
        let s = arg.to_string_lossy();
        if passthrough || !s.starts_with("--") {
            out.push(arg);
            continue;
        }
        if s == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }
        let (flag, val) = match s.split_once('=') {
            Some((flag, val)) => (flag, Some(val)),
            None => (s.as_ref(), None),
        };
        let canon = flag.to_lowercase().replace('_', "-");
        let canon = canonical_flag(&canon);
        match val {
            Some(v) => out.push(OsString::from(format!("{canon}={v}"))),
            None => out.push(OsString::from(canon)),
        }
    }
    out
}

fn canonical_flag(flag: &str) -> &str {
    match flag {
        "--parent-id" => "--parent",
        "--desc" => "--description",
        "--to-root" => "--root",
        "--force" => "--yes",
        other => other,
    }
}

fn parse_id(raw: &str) -> std::result::Result<CategoryId, String> {
    CategoryId::parse(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        parse_from(std::iter::once("cattree").chain(args.iter().copied()))
    }

    #[test]
    fn flags_are_case_and_underscore_tolerant() {
        let cli = parse(&["create", "Peinture", "--Parent_Id=3", "--DESC", "murs"]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.parent, Some(CategoryId::new(3)));
        assert_eq!(args.description.as_deref(), Some("murs"));
    }

    #[test]
    fn ids_accept_hash_prefix() {
        let cli = parse(&["show", "#12"]);
        let Commands::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.id, CategoryId::new(12));
    }

    #[test]
    fn zero_id_is_rejected() {
        let err = Cli::try_parse_from(["cattree", "show", "0"]).unwrap_err();
        assert!(err.to_string().contains("must be greater than zero"));
    }

    #[test]
    fn move_requires_a_destination() {
        assert!(Cli::try_parse_from(["cattree", "move", "4"]).is_err());
        assert!(Cli::try_parse_from(["cattree", "move", "4", "--parent", "2", "--root"]).is_err());

        let cli = parse(&["move", "4", "--to-root"]);
        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert!(args.root);
        assert_eq!(args.parent, None);
    }

    #[test]
    fn values_after_double_dash_are_untouched() {
        let cli = parse(&["create", "--", "--Desc"]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.name, "--Desc");
        assert_eq!(args.description, None);
    }

    #[test]
    fn global_flags_parse_anywhere() {
        let cli = parse(&["tree", "--json", "-vv", "--store", "/tmp/cats.json", "outil"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/cats.json")));
        let Commands::Tree(args) = cli.command else {
            panic!("expected tree");
        };
        assert_eq!(args.query, vec!["outil".to_string()]);
    }
}
