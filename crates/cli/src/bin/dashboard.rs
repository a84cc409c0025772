use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_client::{ApiClient, ApiClientConfig, MemoryTransport, SessionGuard};
use clap::{Parser, Subcommand};
use cli::{execute, format_view, Flow, ShellCommand, TerminalNavigator, TextRenderer};
use dashboard_engine::{Dashboard, NullRenderer, Renderer};
use logger::LogFormat;

/// Exit status after the session was rejected and redirected to login.
const EXIT_REDIRECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Personal finance dashboard in the terminal.")]
struct Args {
    /// Settings file; defaults to ./dashboard.json when present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Never touch the network; every section shows its default data
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dashboard once and print it
    Show {
        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the dashboard and take commands on stdin
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init(args.log_format);

    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref())?;
    let config = ApiClientConfig::from_settings(&settings).context("invalid client settings")?;
    tracing::info!(base_url = %config.base_url, offline = args.offline, "starting dashboard");

    let navigator = Arc::new(TerminalNavigator);
    let client = if args.offline {
        let guard = SessionGuard::new(config.login_url.as_str(), navigator);
        ApiClient::new(Arc::new(MemoryTransport::new()), Arc::new(guard))
    } else {
        ApiClient::http(&config, navigator)?
    };

    match args.command {
        Command::Show { json } => show(client, json).await,
        Command::Shell => shell(client).await,
    }
}

async fn show(client: ApiClient, json: bool) -> Result<ExitCode> {
    let mut dashboard = Dashboard::new(client, Box::new(NullRenderer));
    if let Err(halted) = dashboard.init().await {
        return Ok(redirected(&halted.destination));
    }

    let view = dashboard.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", format_view(&view));
    }
    Ok(ExitCode::SUCCESS)
}

async fn shell(client: ApiClient) -> Result<ExitCode> {
    let renderer: Box<dyn Renderer> = Box::new(TextRenderer);
    let mut dashboard = Dashboard::new(client, renderer);
    if let Err(halted) = dashboard.init().await {
        return Ok(redirected(&halted.destination));
    }
    println!("type 'help' for commands");

    let stdin = io::stdin();
    let mut confirm = |prompt: &str| ask(&stdin, prompt);
    loop {
        let Some(line) = read_line(&stdin, "> ")? else {
            break;
        };
        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match execute(&mut dashboard, command, &mut confirm).await {
            Flow::Continue => {}
            Flow::Notice(message) => println!("{message}"),
            Flow::Quit => break,
            Flow::Redirected(destination) => return Ok(redirected(&destination)),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn redirected(destination: &str) -> ExitCode {
    println!("Redirected to {destination}");
    ExitCode::from(EXIT_REDIRECTED)
}

/// Prompts and reads one line; `None` at end of input.
fn read_line(stdin: &io::Stdin, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end().to_string()))
}

fn ask(stdin: &io::Stdin, prompt: &str) -> bool {
    match read_line(stdin, &format!("{prompt} [y/N] ")) {
        Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        _ => false,
    }
}
