use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use directive_knowledge::{build_bundle, list_files, read_file, DirectiveRoot, TemplateKind};
use directive_mcp::{runtime_env, serve_stdio, Session};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn print_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout.write_all(bytes).and_then(|_| stdout.flush()) {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "directive")]
#[command(about = "Directive knowledge base for AI agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root containing directive/ (default: DIRECTIVE_REPO_ROOT or DIRECTIVE_ROOT, then cwd)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a template bundle (procedure + context + template + primer) as JSON
    Bundle(BundleArgs),

    /// List every file under directive/
    Files,

    /// Print one directive file verbatim
    Cat(CatArgs),

    /// MCP related commands
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },
}

#[derive(Subcommand)]
enum McpCommands {
    /// Start the MCP server over stdio for the repository
    Serve,
}

#[derive(Args)]
struct BundleArgs {
    /// Template file name
    #[arg(value_enum)]
    template: TemplateArg,
}

#[derive(Args)]
struct CatArgs {
    /// Path under directive/ (e.g. directive/reference/agent_context.md)
    path: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TemplateArg {
    #[value(name = "spec_template.md", alias = "spec")]
    Spec,
    #[value(name = "impact_template.md", alias = "impact")]
    Impact,
    #[value(name = "tdr_template.md", alias = "tdr")]
    Tdr,
}

impl From<TemplateArg> for TemplateKind {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Spec => TemplateKind::Spec,
            TemplateArg::Impact => TemplateKind::Impact,
            TemplateArg::Tdr => TemplateKind::Tdr,
        }
    }
}

pub async fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let repo = match cli.repo {
        Some(repo) => repo,
        None => runtime_env::resolve_repo_root().context("Failed to resolve repository root")?,
    };

    match cli.command {
        Commands::Bundle(args) => run_bundle(&repo, args.template.into()),
        Commands::Files => run_files(&repo),
        Commands::Cat(args) => run_cat(&repo, &args.path),
        Commands::Mcp {
            command: McpCommands::Serve,
        } => {
            serve_stdio(Session::for_repo(&repo)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_bundle(repo: &Path, kind: TemplateKind) -> Result<ExitCode> {
    let root = DirectiveRoot::expected(repo);
    match build_bundle(&root, kind.file_name()) {
        Ok(bundle) => {
            let mut json = serde_json::to_string_pretty(&bundle)?;
            json.push('\n');
            print_stdout(json.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_not_found() => {
            eprintln!("{err}");
            eprintln!("Available templates:");
            for path in list_files(&root)
                .iter()
                .filter(|path| path.contains("/templates/"))
            {
                eprintln!(" - {path}");
            }
            eprintln!(
                "Suggestion: restore the missing files under {}/reference/.",
                root.name()
            );
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn run_files(repo: &Path) -> Result<ExitCode> {
    let root = DirectiveRoot::expected(repo);
    let mut out = String::new();
    for path in list_files(&root) {
        out.push_str(&path);
        out.push('\n');
    }
    print_stdout(out.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

fn run_cat(repo: &Path, path: &str) -> Result<ExitCode> {
    let root = DirectiveRoot::expected(repo);
    let file = read_file(&root, path).with_context(|| format!("Failed to read {path}"))?;
    print_stdout(file.content.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}
