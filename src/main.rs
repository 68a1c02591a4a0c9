use clap::Parser;
use env_logger::Env;
use log::info;

use artifetch::{
    cli::args::{CliArgs, Command},
    config::ArtifetchConfig,
    Artifetch,
};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli_args: CliArgs = CliArgs::parse();

    // Nothing touches the local repository before the request is known to be usable.
    let request = match &cli_args.cmd {
        Command::Fetch(args) => {
            if args.skip {
                info!("artifact fetch skipped");
                return Ok(());
            }
            let request = args.to_request()?;
            request.validate()?;
            Some(request)
        }
        Command::ClearCache => None,
    };

    let config = ArtifetchConfig::load(cli_args.config.as_deref())?;

    let mut builder = Artifetch::builder();
    if let Some(local_repository) = cli_args.local_repository.or(config.local_repository) {
        builder = builder.local_repository(local_repository);
    }
    let remote_repositories = if cli_args.remote_repositories.is_empty() {
        config.remote_repositories.unwrap_or_default()
    } else {
        cli_args.remote_repositories
    };
    let artifetch = builder
        .remote_repositories(remote_repositories)
        .offline(cli_args.offline || config.offline.unwrap_or(false))
        .try_build()?;

    match request {
        Some(request) => artifetch.fetch(&request),
        None => artifetch.clear_cache(),
    }
}
