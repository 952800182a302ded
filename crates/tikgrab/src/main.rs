use std::fs;
use std::io::{self, IsTerminal, Read};
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};
use tikgrab_config::{
    Settings, TikgrabConfig, config_exists, get_config_value, load_config, open_in_editor,
    save_config, set_config_value,
};
use tikgrab_core::{GrabError, GrabResult, Platform};
use tikgrab_douyin::DouyinClient;
use tikgrab_tiktok::TikwmExtractor;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::handler::DownloadHandler;
use crate::output::{print_result, print_summary};
use crate::view::ProxyTemplate;

mod api;
mod handler;
mod output;
mod page;
mod view;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web front end
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Resolve download links from the terminal
    Fetch {
        /// Force a platform instead of inferring it from the URL
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        input: Option<String>,
        /// Print the raw JSON body
        #[arg(long)]
        json: bool,
        /// Print only the first media URL
        #[arg(long)]
        simple: bool,
        #[arg(value_name = "URL")]
        urls: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Open config file in editor
    Edit,
}

#[derive(Debug, Parser)]
#[command(name = "tikgrab")]
#[command(version, about = "TikTok and Douyin download links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Config { action } => handle_config_command(action),
        Commands::Serve { bind } => serve(bind).await,
        Commands::Fetch {
            platform,
            input,
            json,
            simple,
            urls,
        } => fetch(platform.as_deref(), input.as_deref(), urls, json, simple).await,
    };

    if let Err(err) = outcome {
        eprintln!("{} {err}", style("Error:").red());
        std::process::exit(1);
    }
}

async fn serve(bind: Option<String>) -> GrabResult<()> {
    let mut config = load_config()?;
    prompt_first_run(&mut config);

    let mut settings = Settings::resolve(&config)?;
    if let Some(bind) = bind {
        settings.bind = bind;
    }
    if settings.apify_token.is_none() {
        tracing::warn!("no Apify token configured, Douyin links will fail");
    }

    let handler = build_handler(&settings)?;
    let proxy = ProxyTemplate::new(&settings.proxy_base)?;
    let app = api::router(AppState::new(handler, proxy));

    let addr: SocketAddr = settings.bind.parse().map_err(|err| {
        GrabError::Config(format!("invalid bind address '{}': {err}", settings.bind))
    })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| GrabError::Config(format!("failed to bind {addr}: {err}")))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| GrabError::Config(format!("server error: {err}")))
}

fn build_handler(settings: &Settings) -> GrabResult<DownloadHandler> {
    let extractor = TikwmExtractor::new(&settings.tikwm_base, settings.timeout)?;
    let douyin = DouyinClient::new(
        settings.apify_endpoint.clone(),
        settings.apify_token.clone(),
        settings.timeout,
    )?;
    Ok(DownloadHandler::new(Arc::new(extractor), douyin))
}

async fn fetch(
    platform: Option<&str>,
    input: Option<&str>,
    urls: Vec<String>,
    json: bool,
    simple: bool,
) -> GrabResult<()> {
    let platform = platform.map(str::parse::<Platform>).transpose()?;
    let urls = gather_inputs(urls, input)?;
    if urls.is_empty() {
        return Err(GrabError::MissingInput);
    }

    let settings = Settings::resolve(&load_config()?)?;
    let handler = build_handler(&settings)?;

    let mut success = 0usize;
    let mut failed = 0usize;
    for url in &urls {
        match handler.handle(Some(url.as_str()), platform).await {
            Ok(result) => {
                success += 1;
                if json {
                    let body = serde_json::to_string_pretty(&result).map_err(|err| {
                        GrabError::InvalidInput(format!("failed to encode result: {err}"))
                    })?;
                    println!("{body}");
                } else {
                    print_result(url, &result, simple);
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {url}: {err}", style("Failed").red());
            }
        }
    }

    if !json && !simple {
        print_summary(success + failed, success, failed);
    }
    Ok(())
}

fn gather_inputs(mut urls: Vec<String>, input: Option<&str>) -> GrabResult<Vec<String>> {
    if let Some(path) = input {
        let content = fs::read_to_string(path)
            .map_err(|err| GrabError::InvalidInput(format!("failed to read input file: {err}")))?;
        urls.extend(parse_lines(&content));
    }

    if urls.is_empty() && !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| GrabError::InvalidInput(format!("failed to read stdin: {err}")))?;
        urls.extend(parse_lines(&buffer));
    }

    Ok(urls)
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Interactive setup on the very first `serve`, when nothing provides a token.
fn prompt_first_run(config: &mut TikgrabConfig) {
    let token_in_env = ["TIKGRAB_APIFY_TOKEN", "APIFY_API_TOKEN"]
        .iter()
        .any(|key| std::env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if token_in_env || config_exists().unwrap_or(true) || !io::stdin().is_terminal() {
        return;
    }

    let theme = ColorfulTheme::default();
    println!(
        "{} Let's configure your tikgrab settings",
        style("First-time setup:").bold().cyan()
    );

    let input: String = Input::with_theme(&theme)
        .with_prompt("Apify API token for Douyin links (optional, press Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    if !input.trim().is_empty() {
        config.api.apify_token = Some(input.trim().to_string());
    }

    if let Err(err) = save_config(config) {
        eprintln!("{} {err}", style("Warning:").yellow());
    } else {
        println!(
            "{} Config file created at ~/.tikgrab/config.toml",
            style("✓").green()
        );
    }
}

fn handle_config_command(action: ConfigAction) -> GrabResult<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config()?;
            match get_config_value(&config, &key) {
                Some(v) => println!("{key} = {v}"),
                None => println!("{key} = <null>"),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            set_config_value(&key, &value)?;
            println!("{} Set {key} = {value}", style("✓").green());
            Ok(())
        }
        ConfigAction::List => {
            let config = load_config()?;
            let show =
                |key: &str| get_config_value(&config, key).unwrap_or_else(|| "<null>".into());
            println!("Current configuration:");
            println!("\n[api]");
            println!(
                "apify_token = {}",
                if config.api.apify_token.is_some() { "<set>" } else { "<null>" }
            );
            println!("apify_endpoint = {}", show("api.apify_endpoint"));
            println!("tikwm_base = {}", show("api.tikwm_base"));
            println!("\n[server]");
            println!("bind = {}", show("server.bind"));
            println!("proxy_base = {}", show("server.proxy_base"));
            println!("\n[http]");
            println!("timeout_secs = {}", show("http.timeout_secs"));
            Ok(())
        }
        ConfigAction::Edit => open_in_editor(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands, parse_lines};

    #[test]
    fn parse_lines_skips_blank_lines() {
        let lines = parse_lines("https://a\n\n   \n  https://b  \n");
        assert_eq!(lines, vec!["https://a".to_string(), "https://b".to_string()]);
    }

    #[test]
    fn parses_fetch_arguments() {
        let cli = Cli::try_parse_from([
            "tikgrab",
            "fetch",
            "--platform",
            "douyin",
            "--json",
            "https://v.douyin.com/xyz",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch {
                platform,
                json,
                simple,
                urls,
                ..
            } => {
                assert_eq!(platform.as_deref(), Some("douyin"));
                assert!(json);
                assert!(!simple);
                assert_eq!(urls, vec!["https://v.douyin.com/xyz".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_serve_bind() {
        let cli = Cli::try_parse_from(["tikgrab", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { bind: Some(ref b) } if b == "0.0.0.0:8080"
        ));
    }
}
