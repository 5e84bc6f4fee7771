//! CLI entrypoint for book-debate
//!
//! This is the main binary that wires together all layers using
//! dependency injection, restores the persisted schedule, and then either
//! serves stage jobs or runs a single command against the store.

mod app;

use anyhow::{Context, Result, bail};
use app::App;
use clap::Parser;
use debate_application::{FiredJob, TimerEngine};
use debate_domain::{
    BookId, CommentDraft, CommentId, DiscussionEdit, DiscussionId, MemberId, NewDiscussion,
    NewReport,
};
use debate_infrastructure::{ConfigLoader, FileConfig};
use debate_presentation::{Cli, Command, ConsoleFormatter, report_target};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::ShowConfig) {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("loading configuration")?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.directory.as_deref());
    check_config(&config)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }
    let json = cli.json || config.output.json;

    let (app, fired) = App::build(&config)?;
    let report = app.restore.execute().await?;

    let result = match cli.command {
        Command::Serve { resync_secs } => {
            if !json {
                print!("{}", ConsoleFormatter::format_restore(&report));
            }
            serve(&app, fired, Duration::from_secs(resync_secs)).await
        }
        command => run_command(&app, command, json).await,
    };

    app.engine.shutdown();
    result
}

/// Initialize logging based on verbosity level, plus an optional daily file.
fn init_logging(verbose: u8, directory: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "debate-lifecycle.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Log every configuration issue; refuse to start on errors.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue.message);
        } else {
            warn!("{}", issue.message);
        }
    }

    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        bail!("configuration has {} error(s)", errors);
    }
    Ok(())
}

/// Dispatch stage jobs until Ctrl-C.
///
/// The schedule is re-synced with the store periodically so one-shot commands
/// run against the same database are picked up.
async fn serve(app: &App, fired: mpsc::Receiver<FiredJob>, resync: Duration) -> Result<()> {
    let shutdown = CancellationToken::new();
    let dispatcher = tokio::spawn(app.dispatcher.clone().run(fired, shutdown.clone()));
    info!("Serving stage jobs ({} armed)", app.engine.armed_count());

    let resync_enabled = !resync.is_zero();
    let mut ticker = tokio::time::interval(if resync_enabled {
        resync
    } else {
        Duration::from_secs(3600)
    });
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.reset();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("waiting for Ctrl-C")?;
                info!("Interrupted, shutting down");
                break;
            }
            _ = ticker.tick(), if resync_enabled => {
                match app.restore.execute().await {
                    Ok(report) => debug!("Re-synced schedule: {} jobs armed", report.rearmed),
                    Err(e) => warn!("Schedule re-sync failed: {}", e),
                }
            }
        }
    }

    shutdown.cancel();
    app.engine.shutdown();
    dispatcher.await.context("dispatcher task")?;
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) {
    if json {
        println!("{}", ConsoleFormatter::format_json(value));
    } else {
        print!("{}", text(value));
    }
}

async fn run_command(app: &App, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Create {
            owner,
            book,
            title,
            start,
            content,
        } => {
            let discussion = app
                .manage
                .create(NewDiscussion::new(
                    MemberId(owner),
                    BookId(book),
                    title,
                    content,
                    start,
                ))
                .await?;
            emit(json, &discussion, ConsoleFormatter::format_discussion);
        }
        Command::Edit {
            id,
            actor,
            title,
            content,
            start,
        } => {
            let mut edit = DiscussionEdit::default();
            if let Some(title) = title {
                edit = edit.with_title(title);
            }
            if let Some(content) = content {
                edit = edit.with_content(content);
            }
            if let Some(start) = start {
                edit = edit.with_start_date(start);
            }
            if edit.is_empty() {
                bail!("nothing to edit: pass --title, --content or --start");
            }
            let discussion = app
                .manage
                .edit(MemberId(actor), DiscussionId(id), edit)
                .await?;
            emit(json, &discussion, ConsoleFormatter::format_discussion);
        }
        Command::Delete { id, actor } => {
            app.manage.delete(MemberId(actor), DiscussionId(id)).await?;
            println!("Deleted discussion {}", id);
        }
        Command::Comment {
            discussion,
            stance,
            content,
        } => {
            let comment = app
                .comments
                .write_comment(CommentDraft::root(
                    DiscussionId(discussion),
                    stance.author(),
                    stance.vote(),
                    content,
                ))
                .await?;
            emit(json, &comment, |c| ConsoleFormatter::format_thread(std::slice::from_ref(c)));
        }
        Command::Reply {
            discussion,
            parent,
            stance,
            content,
        } => {
            let comment = app
                .comments
                .write_comment(CommentDraft::reply(
                    DiscussionId(discussion),
                    stance.author(),
                    CommentId(parent),
                    stance.vote(),
                    content,
                ))
                .await?;
            emit(json, &comment, |c| ConsoleFormatter::format_thread(std::slice::from_ref(c)));
        }
        Command::DeleteComment { id, actor } => {
            if app.comments.delete_comment(MemberId(actor), CommentId(id)).await? {
                println!("Deleted comment {}", id);
            } else {
                println!("Comment {} was already deleted", id);
            }
        }
        Command::Report {
            reporter,
            discussion,
            comment,
            reason,
        } => {
            let target = report_target(discussion, comment)
                .context("pass exactly one of --discussion or --comment")?;
            let outcome = app
                .moderation
                .on_report_added(NewReport::new(MemberId(reporter), target, reason))
                .await?;
            emit(json, &outcome, ConsoleFormatter::format_moderation);
        }
        Command::Show { id } => {
            let id = DiscussionId(id);
            app.manage.record_view(id).await?;
            let summary = app.manage.get(id).await?;
            emit(json, &summary, ConsoleFormatter::format_summary);
        }
        Command::Thread { id } => {
            let thread = app.comments.thread(DiscussionId(id)).await?;
            emit(json, &thread, |t| ConsoleFormatter::format_thread(t));
        }
        Command::Jobs { id } => {
            let jobs = app.orchestrator.pending_jobs(DiscussionId(id)).await?;
            emit(json, &jobs, |j| ConsoleFormatter::format_jobs(j));
        }
        Command::Serve { .. } | Command::ShowConfig => {}
    }
    Ok(())
}
