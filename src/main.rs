use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pyra::archive::ArchiveExtractor;
use pyra::catalog::Catalog;
use pyra::fetch::HttpFetcher;
use pyra::http::HttpClient;
use pyra::install::{Installer, list_installed};
use pyra::name::PackageName;
use pyra::resolve::StoreResolver;
use pyra::runner::{DEFAULT_ENGINE, ProcessEngine, ScriptRunner};
use pyra::runtime::{RealRuntime, Runtime};

/// Extension of runnable script files.
const SCRIPT_SUFFIX: &str = ".pyra";

/// pyra - Pyra package manager and script runner
///
/// Install packages from the Pyra registry and run .pyra scripts with the
/// installed packages resolvable by name.
///
/// Examples:
///   pyra install pyramath    # Install a package from the registry
///   pyra list                # List installed packages
///   pyra script.pyra         # Run a script
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package store root (overrides the default; also via PYRA_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PYRA_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub store_root: Option<PathBuf>,

    /// Registry index file (defaults to the built-in index; also via PYRA_INDEX)
    #[arg(long = "index", env = "PYRA_INDEX", value_name = "PATH", global = true)]
    pub index: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package from the registry
    Install(InstallArgs),

    /// List installed packages
    List(ListArgs),

    /// Run a Pyra script
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// The package name, e.g. "pyramath"
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// List the registry index instead of installed packages
    #[arg(long)]
    pub available: bool,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the script file
    #[arg(value_name = "FILE")]
    pub script: PathBuf,

    /// Script engine program (also via PYRA_ENGINE)
    #[arg(
        long = "engine",
        env = "PYRA_ENGINE",
        value_name = "PROGRAM",
        default_value = DEFAULT_ENGINE
    )]
    pub engine: String,
}

/// `pyra script.pyra` is shorthand for `pyra run script.pyra`.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    if let Some(first) = args.get(1)
        && first.to_string_lossy().ends_with(SCRIPT_SUFFIX)
    {
        args.insert(1, OsString::from("run"));
    }
    args
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let runtime = RealRuntime;

    let root = match cli.store_root.clone() {
        Some(path) => path,
        None => default_store_root(&runtime)?,
    };
    let catalog = match cli.index.as_deref() {
        Some(path) => Catalog::load_from(&runtime, path)?,
        None => Catalog::load_embedded()?,
    };

    match cli.command {
        Commands::Install(args) => install(&runtime, &catalog, root, &args.name).await,
        Commands::List(args) => list(&runtime, &catalog, root, args.available),
        Commands::Run(args) => run(&runtime, root, &args.script, &args.engine).await,
    }
}

/// The default store root, under the user's home directory.
fn default_store_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime.home_dir().context("Could not find home directory")?;
    Ok(home.join("PyraRunner").join("packages"))
}

async fn install<R: Runtime + 'static>(
    runtime: &R,
    catalog: &Catalog,
    root: PathBuf,
    name: &str,
) -> Result<()> {
    let name: PackageName = name.parse()?;
    let client = HttpClient::with_default_timeout()?;
    let installer = Installer::new(
        runtime,
        HttpFetcher::new(runtime, client),
        ArchiveExtractor::new(),
        catalog,
        root,
    );

    let installed = installer.install(&name).await?;
    println!("Installed {} to {}", name, installed.dir.display());
    Ok(())
}

fn list<R: Runtime>(runtime: &R, catalog: &Catalog, root: PathBuf, available: bool) -> Result<()> {
    if available {
        println!("Available packages:");
        for entry in catalog.entries() {
            println!(" - {}: {}", entry.name, entry.description);
        }
        return Ok(());
    }

    let mut rows = list_installed(runtime, catalog, root)?;
    if rows.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    rows.sort();
    println!("Installed packages:");
    for (name, description) in rows {
        println!(" - {}: {}", name, description);
    }
    Ok(())
}

async fn run<R: Runtime>(runtime: &R, root: PathBuf, script: &Path, engine: &str) -> Result<()> {
    let resolver = StoreResolver::new(runtime, root);
    let mut runner = ScriptRunner::new(runtime, ProcessEngine::new(engine), Box::new(resolver));

    let output = runner.run(script).await?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);

    if !output.stderr.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
