//! azdterm - launch Azure Developer CLI workflows in a terminal task
//!
//! Dispatches the requested command through the command registry, then
//! attaches this process's stdin and stdout to the focused terminal until
//! the task exits.

use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use azdterm::commands::{PipelineOptions, LOGIN_COMMAND_ID, PIPELINE_CONFIG_COMMAND_ID};
use azdterm::{default_registry, ConfigLoader, TerminalHost};

/// Parsed command line
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Command id to invoke
    command_id: Option<&'static str>,
    /// Flags for `pipeline-config`
    pipeline: PipelineOptions,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self, String> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or("Missing config file path")?;
                    app_args.config_path = Some(PathBuf::from(path));
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--principal-name" => {
                    app_args.pipeline.principal_name =
                        Some(args.next().ok_or("Missing value for --principal-name")?);
                }
                "--remote-name" => {
                    app_args.pipeline.remote_name =
                        args.next().ok_or("Missing value for --remote-name")?;
                }
                "--principal-role" => {
                    app_args.pipeline.principal_role =
                        args.next().ok_or("Missing value for --principal-role")?;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("azdterm v{}", azdterm::VERSION);
                    process::exit(0);
                }
                "login" => app_args.command_id = Some(LOGIN_COMMAND_ID),
                "pipeline-config" => app_args.command_id = Some(PIPELINE_CONFIG_COMMAND_ID),
                other if other.starts_with('-') => {
                    return Err(format!("Unknown option: {}", other));
                }
                other => return Err(format!("Unknown command: {}", other)),
            }
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("azdterm - run Azure Developer CLI workflows in a terminal task");
    println!();
    println!("USAGE:");
    println!("    azdterm [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    login                      Sign in with `azd login`");
    println!("    pipeline-config            Configure a CI pipeline with `azd pipeline config`");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>        Path to configuration file");
    println!("    -d, --debug                Enable debug logging");
    println!("        --principal-name <N>   Service principal name (pipeline-config)");
    println!("        --remote-name <R>      Git remote name, default 'origin' (pipeline-config)");
    println!("        --principal-role <R>   Role to assign, default 'Contributor' (pipeline-config)");
    println!("    -h, --help                 Print this help message");
    println!("    -v, --version              Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    AZDTERM_CONFIG             Path to configuration file");
    println!("    RUST_LOG                   Set logging level (error, warn, info, debug, trace)");
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Pipe stdin/stdout through the focused terminal until its task exits
async fn attach(host: &TerminalHost) -> anyhow::Result<i32> {
    let Some(terminal) = host.focused().await else {
        debug!("No focused terminal to attach to");
        return Ok(0);
    };

    let input = terminal.input_handle().await;
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if input.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = terminal.read_output().await {
        stdout.write_all(&chunk).await?;
        stdout.flush().await?;
    }

    Ok(terminal.wait().await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        print_help();
        process::exit(2);
    });

    init_logging(args.debug);

    let Some(command_id) = args.command_id else {
        print_help();
        process::exit(2);
    };

    let config = match &args.config_path {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => azdterm::init()?,
    };

    let host = Arc::new(TerminalHost::new());
    let registry = default_registry(&config, Arc::clone(&host), args.pipeline);

    if let Err(e) = registry.invoke(command_id).await {
        eprintln!("azdterm: {}", e);
        process::exit(1);
    }

    let code = attach(&host).await?;
    info!("Task exited with code {}", code);
    process::exit(code);
}
