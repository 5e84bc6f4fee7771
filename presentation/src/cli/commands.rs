//! CLI command definitions

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use debate_domain::{CommentId, DiscussionId, MemberId, ReportTarget, VoteType};
use std::path::PathBuf;

/// Stance of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteArg {
    Agree,
    Disagree,
}

impl From<VoteArg> for VoteType {
    fn from(vote: VoteArg) -> Self {
        match vote {
            VoteArg::Agree => VoteType::Agree,
            VoteArg::Disagree => VoteType::Disagree,
        }
    }
}

/// CLI arguments for book-debate
#[derive(Parser, Debug)]
#[command(name = "debate-lifecycle")]
#[command(author, version, about = "Time-gated book discussions with a quorum check")]
#[command(long_about = r#"
Runs the lifecycle of book discussions: a proposed discussion is scheduled
only if enough members took each side before it starts, runs for a day,
gets analyzed and is then completed. Reports can block a discussion or a
comment at any point.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./debate.toml       Project-level config
3. ~/.config/book-debate/config.toml   Global config

Example:
  debate-lifecycle serve
  debate-lifecycle create --owner 1 --book 42 --title "The ending" --start 2026-03-01T18:00:00Z "Was it earned?"
  debate-lifecycle comment 7 --author 3 --vote agree "Absolutely"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Restore the schedule and run stage jobs until interrupted
    Serve {
        /// Seconds between schedule re-syncs with the store (0 disables)
        #[arg(long, default_value_t = 30)]
        resync_secs: u64,
    },

    /// Propose a new discussion
    Create {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        book: i64,
        #[arg(long)]
        title: String,
        /// Debate start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Opening statement
        content: String,
    },

    /// Edit a proposed discussion nobody has joined yet
    Edit {
        id: i64,
        #[arg(long)]
        actor: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// New debate start (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },

    /// Delete a discussion and cancel its timeline
    Delete {
        id: i64,
        #[arg(long)]
        actor: i64,
    },

    /// Write a root comment
    Comment {
        discussion: i64,
        #[command(flatten)]
        stance: Stance,
        content: String,
    },

    /// Reply to a comment
    Reply {
        discussion: i64,
        parent: i64,
        #[command(flatten)]
        stance: Stance,
        content: String,
    },

    /// Delete one of your comments
    DeleteComment {
        id: i64,
        #[arg(long)]
        actor: i64,
    },

    /// Report a discussion or a comment
    Report {
        #[arg(long)]
        reporter: i64,
        #[arg(long, conflicts_with = "comment", required_unless_present = "comment")]
        discussion: Option<i64>,
        #[arg(long)]
        comment: Option<i64>,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Show a discussion with its tally and pending jobs
    Show { id: i64 },

    /// Show the comment thread of a discussion
    Thread { id: i64 },

    /// List the pending stage jobs of a discussion
    Jobs { id: i64 },

    /// Show configuration file locations and exit
    ShowConfig,
}

/// Author and vote of a comment
#[derive(Args, Debug, Clone)]
pub struct Stance {
    #[arg(long)]
    pub author: i64,
    #[arg(long, value_enum)]
    pub vote: VoteArg,
}

impl Stance {
    pub fn author(&self) -> MemberId {
        MemberId(self.author)
    }

    pub fn vote(&self) -> VoteType {
        self.vote.into()
    }
}

impl Command {
    /// Whether the command needs the stage dispatcher running.
    pub fn is_service(&self) -> bool {
        matches!(self, Command::Serve { .. })
    }
}

/// Target of a `report` command.
pub fn report_target(discussion: Option<i64>, comment: Option<i64>) -> Option<ReportTarget> {
    match (discussion, comment) {
        (Some(id), None) => Some(ReportTarget::Discussion(DiscussionId(id))),
        (None, Some(id)) => Some(ReportTarget::Comment(CommentId(id))),
        _ => None,
    }
}
