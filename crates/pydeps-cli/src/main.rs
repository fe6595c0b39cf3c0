mod clear_cache;
mod config;
mod resolve;

use clap::{ArgAction, Parser, Subcommand};
use console::style;

use clear_cache::ClearCacheArgs;
use resolve::ResolveArgs;

#[derive(Parser, Debug)]
#[command(name = "pydeps")]
#[command(author, version, about = "Resolve the transitive dependencies of Python packages", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the dependency closure of a package
    Resolve(ResolveArgs),

    /// Remove every downloaded archive from the cache
    #[command(name = "clear-cache", alias = "clearcache")]
    ClearCache(ClearCacheArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve(args) => resolve::execute(args).await,
        Commands::ClearCache(args) => clear_cache::execute(args).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from(["pydeps", "-vv", "resolve", "flask", "0.9", "--once"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.requirement, "flask");
                assert_eq!(args.version.as_deref(), Some("0.9"));
                assert!(args.once);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_clear_cache_alias() {
        let cli = Cli::try_parse_from(["pydeps", "clearcache"]).unwrap();
        assert!(matches!(cli.command, Commands::ClearCache(_)));
    }
}
