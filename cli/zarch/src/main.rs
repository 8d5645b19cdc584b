//! zarch — package manager CLI for the SwiftFlow language.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

use zarch_registry::{FsCredentialStore, HttpRegistry};

#[derive(Parser)]
#[command(name = "zarch", version, about = "The SwiftFlow package manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new SwiftFlow package
    Init {
        /// Package name
        name: String,
    },
    /// Install packages (from SwiftList.txt when no reference is given)
    Install {
        /// Package name, name@version, or a local path (./, ../, /)
        reference: Option<String>,
        /// Skip the dependency lists of installed packages
        #[arg(long = "no-get-dep")]
        no_deps: bool,
    },
    /// Package the current project and upload it to the registry
    Publish {
        /// Build and hash the archive without uploading
        #[arg(long)]
        dry_run: bool,
    },
    /// Stage a distributable copy of the package under dist/
    Build,
    /// Authenticate against the registry
    Login {
        /// Registry account name
        username: String,
        /// Account password
        password: String,
    },
    /// Search the registry for packages
    Search {
        /// Search keyword
        query: String,
    },
    /// Build a native launcher for a SwiftFlow file
    Compile {
        /// Input .swf file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Install { reference, no_deps } => {
            let registry = HttpRegistry::from_env()?;
            commands::install::run(&cwd, &registry, reference.as_deref().unwrap_or(""), no_deps)
        }

        Commands::Publish { dry_run } => {
            let registry = HttpRegistry::from_env()?;
            let store = FsCredentialStore::default_path()?;
            commands::publish::run(&cwd, &registry, &store, dry_run)
        }

        Commands::Build => commands::build::run(&cwd),

        Commands::Login { username, password } => {
            let registry = HttpRegistry::from_env()?;
            let store = FsCredentialStore::default_path()?;
            commands::login::run(&registry, &store, &username, &password)
        }

        Commands::Search { query } => {
            let registry = HttpRegistry::from_env()?;
            commands::search::run(&registry, &query)
        }

        Commands::Compile { file } => commands::compile::run(&file),
    }
}
