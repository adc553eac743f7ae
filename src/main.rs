use clap::Parser;
use nuscan::application::SelectionPolicy;
use nuscan::catalog::RepositorySelection;
use nuscan::commands::{self, config::Config};
use std::path::PathBuf;
use std::process::ExitCode;

/// nuscan - search and download packages across NuGet v3 feeds
///
/// Every feed of the built-in catalog is searched unless --repository or
/// --repository-list narrows the selection.
///
/// Examples:
///   nuscan search Newtonsoft.Json 13.*     # All 13.x versions on every feed
///   nuscan download Foo 1.0.0 -o pkgs      # Download foo.1.0.0.nupkg into pkgs/
#[derive(Parser, Debug)]
#[command(author, version = env!("NUSCAN_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List the repositories a search would query
    ListRepositories(ListArgs),

    /// Search for a package and print every matching version
    Search(SearchArgs),

    /// Download one matching package
    Download(DownloadArgs),
}

#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Search only this repository (alias or service index URL)
    #[arg(long, short = 'r', value_name = "ALIAS|URL", conflicts_with = "repository_list")]
    pub repository: Option<String>,

    /// Search the repositories listed in this file, one URL per line
    #[arg(long = "repository-list", short = 'l', value_name = "FILE")]
    pub repository_list: Option<PathBuf>,

    /// Show progress information
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Request timeout in seconds
    #[arg(long, env = "NUSCAN_TIMEOUT", value_name = "SECS", default_value_t = commands::config::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Number of repositories searched at the same time
    #[arg(
        long,
        short = 'j',
        env = "NUSCAN_JOBS",
        value_name = "N",
        default_value_t = nuscan::application::DEFAULT_CONCURRENCY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub jobs: usize,
}

impl CommonArgs {
    fn selection(&self) -> RepositorySelection {
        match (&self.repository, &self.repository_list) {
            (Some(repository), _) => RepositorySelection::Single(repository.clone()),
            (None, Some(path)) => RepositorySelection::ListFile(path.clone()),
            (None, None) => RepositorySelection::All,
        }
    }

    fn config(&self) -> Config {
        Config::new(self.selection())
            .with_timeout_secs(self.timeout)
            .with_jobs(self.jobs)
            .with_verbose(self.verbose)
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Package name to search for
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Exact version, or a prefix ending in '*' (e.g. "1.2.*")
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Package name to download
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Exact version, or a prefix ending in '*' (e.g. "1.2.*")
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Which matching version to download
    #[arg(long, value_name = "POLICY", default_value_t = SelectionPolicy::Lowest)]
    pub select: SelectionPolicy,

    /// Directory the package is written to
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

fn verbose(command: &Commands) -> bool {
    match command {
        Commands::ListRepositories(args) => args.common.verbose,
        Commands::Search(args) => args.common.verbose,
        Commands::Download(args) => args.common.verbose,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        eprintln!("No command given. Run 'nuscan --help' for usage.");
        return ExitCode::FAILURE;
    };

    let filter = if verbose(&command) { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let runtime = nuscan::runtime::RealRuntime;
    let result = match command {
        Commands::ListRepositories(args) => {
            commands::list_repositories(runtime, args.common.config())
        }
        Commands::Search(args) => {
            commands::search(
                runtime,
                args.common.config(),
                &args.package,
                args.version.as_deref(),
            )
            .await
        }
        Commands::Download(args) => {
            commands::download(
                runtime,
                args.common.config(),
                &args.package,
                args.version.as_deref(),
                args.select,
                &args.output,
            )
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
