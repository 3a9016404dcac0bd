//! Command-line surface: argument parsing and the two commands.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use diagram::{AutomatonDescription, DescriptionError};
use serde_json::Value;

use crate::minimizer::client::interpret_response;
use crate::minimizer::{MinimizerClient, MinimizerConfig, MinimizerError};
use crate::render::{self, DirectoryRenderer, OutputFormat, Renderer, StreamRenderer};
use crate::session::{Effect, Event, Pane, PaneId, ViewState};

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Minimizer(#[from] MinimizerError),
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error("failed to read input {path}: {source}")]
    Input { path: String, source: io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "dfaviz", about = "Render a DFA and its minimized form as Mermaid flowcharts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send an automaton to the minimization service and render both diagrams.
    Minimize(MinimizeArgs),
    /// Compile a local description (or a saved service response) to Mermaid on stdout.
    Compile(CompileArgs),
}

#[derive(Args, Debug)]
pub struct MinimizeArgs {
    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    pub input: String,

    /// Overrides `MINIMIZER_URL`.
    #[arg(long)]
    pub service_url: Option<String>,

    /// Write `original.<ext>` and `minimized.<ext>` here instead of stdout.
    #[arg(long, env = "DFAVIZ_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, value_enum, env = "DFAVIZ_FORMAT", default_value_t = OutputFormat::Mmd)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    pub input: String,
}

/// Run the parsed command to completion.
///
/// # Errors
///
/// Returns [`AppError`] for configuration, input and parse failures. Failures
/// the user should see as notices are printed and mapped to a failure exit code.
pub async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    match cli.command {
        Command::Minimize(args) => run_minimize(args).await,
        Command::Compile(args) => run_compile(&args),
    }
}

async fn run_minimize(args: MinimizeArgs) -> Result<ExitCode, AppError> {
    let mut config = MinimizerConfig::from_env()?;
    if let Some(url) = &args.service_url {
        config = config.with_url(url)?;
    }
    let client = MinimizerClient::new(&config)?;
    tracing::debug!(url = client.url(), "minimizer client ready");
    let source = read_input(&args.input)?;

    let mut renderer: Box<dyn Renderer> = match args.out_dir {
        Some(dir) => Box::new(DirectoryRenderer::new(dir, args.format)),
        None => Box::new(StreamRenderer::new(io::stdout())),
    };
    let state = minimize(&client, source, renderer.as_mut()).await;
    Ok(report(&state))
}

/// Drive one submission through the view state and render whatever came back.
///
/// Nothing is rendered when the submission is refused or fails.
pub async fn minimize(client: &MinimizerClient, source: String, renderer: &mut dyn Renderer) -> ViewState {
    let (state, effect) = ViewState::default().handle(Event::SubmitRequested { source });
    let Some(Effect::Submit(source)) = effect else {
        return state;
    };
    tracing::debug!(submit = state.submit.label, enabled = state.submit.enabled, "submission pending");

    let result = client.submit(&source).await;
    let (state, _) = state.handle(Event::ResponseReceived(result));
    if state.notice.is_some() {
        return state;
    }
    render::render_panes(state, renderer)
}

fn run_compile(args: &CompileArgs) -> Result<ExitCode, AppError> {
    let text = read_input(&args.input)?;
    let value: Value = serde_json::from_str(&text).map_err(DescriptionError::from)?;

    if value.get("original").is_some() {
        let state = compile_response(value, &mut StreamRenderer::new(io::stdout()))?;
        return Ok(report(&state));
    }

    let afd = AutomatonDescription::from_value(value)?;
    print!("{}", diagram::compile(&afd));
    Ok(ExitCode::SUCCESS)
}

/// Render a saved service response as though it had just arrived.
fn compile_response(value: Value, renderer: &mut dyn Renderer) -> Result<ViewState, AppError> {
    let response = interpret_response(200, value)?;
    let (state, _) = ViewState::default().handle(Event::ResponseReceived(Ok(response)));
    Ok(render::render_panes(state, renderer))
}

/// Print the notice, log and pane failures of a finished session.
fn report(state: &ViewState) -> ExitCode {
    if let Some(notice) = &state.notice {
        eprintln!("{}", notice.message());
        return ExitCode::FAILURE;
    }
    if let Some(log) = &state.log {
        eprintln!("--- service log ---\n{log}");
    }

    let mut failed = false;
    for pane in PaneId::ALL {
        if let Pane::Failed(message) = state.pane(pane) {
            eprintln!("failed to render {} diagram: {message}", pane.name());
            failed = true;
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn read_input(path: &str) -> Result<String, AppError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| AppError::Input { path: "stdin".to_owned(), source })?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|source| AppError::Input { path: path.to_owned(), source })
}
