//! steward — an LLM-backed command-line assistant.
//!
//! Drives one of the supported backends through a bounded tool-calling
//! loop, prompting for confirmation before side-effecting tools run.

#[macro_use]
extern crate tracing;

mod config;
mod tools;

use std::io::{self, Write as _};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use steward_backend::BackendClient;
use steward_core::tool::Approval;
use steward_core::{Agent, AgentBuilder, TranscriptSource};
use tracing_subscriber::EnvFilter;

use tools::{ListDirTool, ReadFileTool, SearchFilesTool, ShellTool, WriteFileTool};

const BAR_CHAR: &str = "▎";
const TOOL_ECHO_LIMIT: usize = 500;

#[derive(Debug, Parser)]
#[command(name = "steward", about = "An LLM-backed command-line assistant")]
struct Args {
    /// LLM provider to talk to: "openai" or "anthropic". Defaults to
    /// $DEFAULT_LLM_PROVIDER, then "openai".
    #[arg(short, long)]
    provider: Option<String>,

    /// Run a single instruction and exit instead of starting the REPL.
    #[arg(short, long)]
    command: Option<String>,

    /// Execute gated tools without asking for confirmation.
    #[arg(long)]
    no_confirm: bool,

    /// Upper bound on model calls per user turn.
    #[arg(long, default_value_t = 10)]
    max_iterations: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let backend_config = match config::load(args.provider.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    info!("using backend: {:?}", backend_config.kind());
    let client = BackendClient::new(backend_config);

    let spinner = Spinner::default();
    let mut agent = AgentBuilder::with_provider(client)
        .with_system_prompt(
            include_str!("./system_prompt.md").replace("{{HOST_OS}}", host_os()),
        )
        .with_tool(ReadFileTool::new())
        .with_tool(WriteFileTool::new())
        .with_tool(ListDirTool::new())
        .with_tool(ShellTool::new())
        .with_tool(SearchFilesTool::new())
        .with_max_iterations(args.max_iterations)
        .with_confirm_enabled(!args.no_confirm)
        .on_approval({
            let spinner = spinner.clone();
            move |approval| {
                let mut approved = false;
                spinner.suspended(|| approved = prompt_approval(approval));
                approved
            }
        })
        .on_transcript({
            let spinner = spinner.clone();
            move |text, source| {
                spinner.suspended(|| print_transcript(text, source));
            }
        })
        .build();

    if let Some(command) = &args.command {
        let reply = run_turn(&mut agent, command, &spinner).await;
        println!("{} {reply}", BAR_CHAR.cyan());
        return ExitCode::SUCCESS;
    }

    run_repl(&mut agent, &spinner).await;
    ExitCode::SUCCESS
}

async fn run_turn(
    agent: &mut Agent<BackendClient>,
    input: &str,
    spinner: &Spinner,
) -> String {
    spinner.start();
    let reply = agent.chat(input).await;
    spinner.stop();
    reply
}

async fn run_repl(agent: &mut Agent<BackendClient>, spinner: &Spinner) {
    println!(
        "{}",
        "steward — describe a task, /help for commands, /quit to exit".bold()
    );

    loop {
        print!("\n{} ", "you:".green().bold());
        io::stdout().flush().ok();

        let Some(line) = read_line() else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(command, agent) {
                break;
            }
            continue;
        }

        let reply = run_turn(agent, line, spinner).await;
        println!("{} {reply}", BAR_CHAR.cyan());
    }

    println!("{}", "bye".dimmed());
}

/// Handles a slash command. Returns `false` when the REPL should exit.
fn handle_command(command: &str, agent: &mut Agent<BackendClient>) -> bool {
    match command.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return false,
        "help" | "h" | "?" => {
            println!("{}  show this help", "/help ".cyan());
            println!("{}  discard the conversation", "/reset".cyan());
            println!("{}  list available tools", "/tools".cyan());
            println!("{}  toggle confirmation prompts", "/auto ".cyan());
            println!("{}  exit", "/quit ".cyan());
        }
        "reset" => {
            agent.reset();
            println!("{}", "conversation reset".dimmed());
        }
        "tools" => {
            for spec in agent.registry().specs() {
                println!("{}  {}", spec.name.cyan(), spec.description);
            }
        }
        "auto" => {
            let enabled = !agent.confirm_enabled();
            agent.set_confirm_enabled(enabled);
            if enabled {
                println!("{}", "confirmation prompts enabled".yellow());
            } else {
                println!("{}", "confirmation prompts disabled".yellow());
            }
        }
        other => {
            println!("{} /{other}", "unknown command:".red());
        }
    }
    true
}

/// Shows a gated tool call and reads the user's decision. Anything but an
/// explicit yes declines.
fn prompt_approval(approval: &Approval) -> bool {
    let bar = BAR_CHAR.yellow().to_string();
    println!(
        "\n{bar}⚠ agent wants to run {}:",
        approval.tool().bright_white().bold()
    );
    let arguments = serde_json::to_string_pretty(approval.arguments())
        .unwrap_or_else(|_| approval.arguments().to_string());
    for line in arguments.lines() {
        println!("{bar}{line}");
    }
    print!("Proceed? [y/N]: ");
    io::stdout().flush().ok();

    let Some(line) = read_line() else {
        return false;
    };
    let line = line.trim();
    line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes")
}

fn print_transcript(text: &str, source: TranscriptSource) {
    match source {
        TranscriptSource::Assistant => {
            println!("{} {}", BAR_CHAR.cyan(), text.bright_white());
        }
        TranscriptSource::Tool => {
            let shown: String = text.chars().take(TOOL_ECHO_LIMIT).collect();
            let ellipsis = if text.chars().count() > TOOL_ECHO_LIMIT {
                "..."
            } else {
                ""
            };
            println!("{} {}{ellipsis}", BAR_CHAR.magenta(), shown.dimmed());
        }
    }
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {err}");
            None
        }
    }
}

/// A spinner shown while the model call is in flight. Output produced by
/// the transcript and approval callbacks is printed through
/// [`Spinner::suspended`] so it never tears the spinner line.
#[derive(Clone, Default)]
struct Spinner(Arc<Mutex<Option<ProgressBar>>>);

impl Spinner {
    fn start(&self) {
        let style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message("Thinking...");
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.0.lock().unwrap() = Some(bar);
    }

    fn stop(&self) {
        if let Some(bar) = self.0.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }

    fn suspended<F: FnOnce()>(&self, f: F) {
        match &*self.0.lock().unwrap() {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

#[inline]
fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        _ => "some other OS",
    }
}
