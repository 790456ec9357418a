use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use client_core::{
    load_settings, render::render_view, ApiClient, Completion, ControllerOptions, MemoryCredentials,
    RefreshController, SelectionOutcome, UiEvent, ViewEvent,
};
use shared::domain::{ExerciseKind, Selection};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./trends.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    kind: Option<ExerciseKind>,
    #[arg(long)]
    exercise: Option<String>,
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
    /// Keep reading selection changes from stdin after the first refresh.
    #[arg(long)]
    interactive: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| format!("{raw}: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(token) = args.token {
        settings.access_token = Some(token);
    }
    if let Some(kind) = args.kind {
        settings.exercise_kind = kind;
    }

    let credentials = Arc::new(MemoryCredentials::new(settings.access_token.clone()));
    let client = ApiClient::new(&settings.server_url, credentials.clone())
        .with_context(|| format!("invalid server url {}", settings.server_url))?;
    let controller = Arc::new(RefreshController::new(
        Arc::new(client),
        ControllerOptions::from_settings(&settings),
    ));
    info!(server = %settings.server_url, kind = %settings.exercise_kind, "trends client ready");

    let exercise = match args.exercise {
        Some(exercise) => exercise,
        None => {
            let catalogue = controller
                .exercises(settings.exercise_kind)
                .await
                .with_context(|| match credentials.logout_message() {
                    Some(message) => message.to_string(),
                    None => format!("failed to load {} exercises", settings.exercise_kind),
                })?;
            match catalogue.into_iter().next() {
                Some(first) => first,
                None => {
                    println!("No {} exercises recorded yet.", settings.exercise_kind);
                    return Ok(());
                }
            }
        }
    };

    let selection =
        Selection::new(settings.exercise_kind, exercise).with_range(args.start, args.end);
    match controller.on_selection_changed(selection) {
        SelectionOutcome::Started(cycle) => {
            let report = cycle.settled().await;
            info!(
                token = %report.token,
                rendered = report.count(Completion::Rendered),
                errored = report.count(Completion::Errored),
                unexpected = ?report.unexpected,
                "refresh settled"
            );
        }
        SelectionOutcome::Rejected(err) => warn!(error = %err, "selection rejected"),
        SelectionOutcome::Ignored => bail!("no exercise selected"),
    }
    print!("{}", render_view(&controller.view()));

    if args.interactive {
        run_interactive(controller).await?;
    }
    Ok(())
}

fn parse_command(line: &str) -> Result<Option<UiEvent>, String> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let optional_date = |raw: &str| match raw {
        "" | "-" => Ok(None),
        raw => parse_date(raw).map(Some),
    };
    let event = match command {
        "exercise" => UiEvent::ExerciseChanged(rest.to_string()),
        "start" => UiEvent::StartDateChanged(optional_date(rest)?),
        "end" => UiEvent::EndDateChanged(optional_date(rest)?),
        "kind" => UiEvent::KindChanged(rest.parse()?),
        "" => return Ok(None),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(event))
}

/// Prints the view whenever it changes and feeds stdin commands
/// (`exercise <name>`, `start <date|->`, `end <date|->`, `kind <kind>`,
/// `quit`) to the controller.
async fn run_interactive(controller: Arc<RefreshController>) -> Result<()> {
    let mut events = controller.subscribe_events();
    let printer = {
        let controller = controller.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ViewEvent::StaleDiscarded { .. }) => {}
                    Ok(_) => print!("{}", render_view(&controller.view())),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "view events lagged");
                        print!("{}", render_view(&controller.view()));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "quit" {
            break;
        }
        match parse_command(&line) {
            Ok(Some(event)) => {
                if let SelectionOutcome::Ignored = controller.dispatch(event) {
                    println!("Choose an exercise to load its trends.");
                }
            }
            Ok(None) => {}
            Err(err) => println!("{err}"),
        }
    }

    printer.abort();
    Ok(())
}
