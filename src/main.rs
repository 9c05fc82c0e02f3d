use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use scaffold_kit::actions::{ActionContext, IssueCreateAction, IssueCreateRequest, RecordedOutputs};
use scaffold_kit::config::{self, GlobalMap, GlobalValue, LoadConfigOptions};
use scaffold_kit::gitlab::GitLabClientFactory;
use scaffold_kit::integrations;

#[derive(Parser)]
#[command(name = "scaffold-kit", version, about = "Templating config and issue tooling")]
struct Cli {
    /// Enable debug logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved templating configuration.
    Config {
        /// Path to package.json (defaults to ./package.json).
        #[arg(short, long)]
        package: Option<PathBuf>,
        /// Override a global, e.g. `--global private=false`.
        #[arg(short, long = "global", value_name = "KEY=VALUE", value_parser = parse_global)]
        globals: Vec<(String, GlobalValue)>,
    },
    /// Create an issue from a JSON input file.
    CreateIssue {
        /// JSON file with the issue fields (camelCase).
        #[arg(short, long)]
        input: PathBuf,
        /// Path to the integrations file.
        #[arg(long)]
        integrations: Option<PathBuf>,
    },
}

fn parse_global(raw: &str) -> Result<(String, GlobalValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_owned(), GlobalValue::infer(value)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    match cli.command {
        Commands::Config { package, globals } => {
            let options = LoadConfigOptions {
                package_path: package,
                global_overrides: globals.into_iter().collect::<GlobalMap>(),
            };
            let config = config::load_config(options).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::CreateIssue {
            input,
            integrations: integrations_path,
        } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let request: IssueCreateRequest = serde_json::from_str(&raw)
                .with_context(|| format!("parsing issue input from {}", input.display()))?;
            let integrations = integrations::load_integrations(integrations_path.as_deref())?;

            let action = IssueCreateAction::new(integrations, GitLabClientFactory);
            let mut outputs = RecordedOutputs::default();
            let mut ctx = ActionContext::new(request, &mut outputs);
            action.handler(&mut ctx).await?;

            println!("{}", serde_json::to_string_pretty(&outputs.to_json())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_infers_types() {
        assert_eq!(
            parse_global("private=false").unwrap(),
            ("private".to_owned(), GlobalValue::Bool(false))
        );
        assert_eq!(
            parse_global("baseVersion=1.2.3").unwrap(),
            ("baseVersion".to_owned(), GlobalValue::from("1.2.3"))
        );
        assert_eq!(
            parse_global("note=a=b").unwrap(),
            ("note".to_owned(), GlobalValue::from("a=b"))
        );
        assert!(parse_global("novalue").is_err());
        assert!(parse_global("=x").is_err());
    }

    #[test]
    fn cli_parses_repeated_globals() {
        let cli = Cli::try_parse_from([
            "scaffold-kit",
            "config",
            "--global",
            "a=1",
            "-g",
            "b=true",
        ])
        .unwrap();
        match cli.command {
            Commands::Config { globals, package } => {
                assert!(package.is_none());
                assert_eq!(globals.len(), 2);
            }
            Commands::CreateIssue { .. } => panic!("expected config command"),
        }
    }
}
