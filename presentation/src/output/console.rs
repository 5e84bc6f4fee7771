//! Console output formatter for discussions, threads and schedules

use colored::Colorize;
use debate_application::{DiscussionSummary, ModerationOutcome, RestoreReport};
use debate_domain::{Comment, CommentId, Discussion, DiscussionStatus, ScheduledJob};
use serde::Serialize;
use std::collections::HashMap;

/// Formats lifecycle results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a discussion with its tally and pending jobs
    pub fn format_summary(summary: &DiscussionSummary) -> String {
        let mut output = Self::format_discussion(&summary.discussion);

        output.push_str(&format!(
            "{} {}\n",
            "Votes:".cyan().bold(),
            summary.tally
        ));

        if let Some(analysis) = &summary.discussion.analysis {
            output.push_str(&Self::section_header("Analysis"));
            output.push_str(&format!(
                "{} {} ({}% agree / {}% disagree)\n{}\n\n{}\n",
                "Verdict:".bold(),
                analysis.result.as_str().yellow().bold(),
                analysis.agree_percent,
                analysis.disagree_percent,
                analysis.conclusion,
                analysis.reasoning.dimmed()
            ));
        }

        if !summary.pending_jobs.is_empty() {
            output.push_str(&Self::section_header("Pending Jobs"));
            output.push_str(&Self::format_jobs(&summary.pending_jobs));
        }

        output
    }

    /// Format the header block of a discussion
    pub fn format_discussion(discussion: &Discussion) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}  {}\n",
            format!("#{}", discussion.id).dimmed(),
            discussion.title.bold(),
            Self::status(discussion.status)
        ));
        output.push_str(&format!(
            "{} member {}  {} book {}  {} {}\n",
            "Owner:".cyan(),
            discussion.owner,
            "Book:".cyan(),
            discussion.book,
            "Views:".cyan(),
            discussion.views
        ));
        output.push_str(&format!(
            "{} {} -> {}\n",
            "Debate:".cyan(),
            discussion.start_date.format("%Y-%m-%d %H:%M UTC"),
            discussion.closed_at.format("%Y-%m-%d %H:%M UTC")
        ));
        if discussion.deleted {
            output.push_str(&format!("{}\n", "(deleted)".red()));
        }
        output.push_str(&format!("\n{}\n\n", discussion.content));

        output
    }

    /// Format a thread in display order, replies indented under their parents
    pub fn format_thread(comments: &[Comment]) -> String {
        if comments.is_empty() {
            return format!("{}\n", "No comments yet".dimmed());
        }

        let mut depth: HashMap<CommentId, usize> = HashMap::new();
        let mut output = String::new();

        for comment in comments {
            let level = comment
                .parent_id
                .and_then(|parent| depth.get(&parent))
                .map_or(0, |level| level + 1);
            depth.insert(comment.id, level);

            let stance = if comment.vote.is_agree() {
                comment.vote.as_str().green()
            } else {
                comment.vote.as_str().red()
            };
            let header = format!(
                "{} member {} [{}]",
                format!("#{}", comment.id).dimmed(),
                comment.author,
                stance
            );
            output.push_str(&Self::indent(
                &format!("{}\n{}", header, comment.content),
                &"  ".repeat(level),
            ));
            output.push('\n');
        }

        output
    }

    /// Format pending stage jobs in firing order
    pub fn format_jobs(jobs: &[ScheduledJob]) -> String {
        if jobs.is_empty() {
            return format!("{}\n", "No pending jobs".dimmed());
        }

        jobs.iter()
            .map(|job| {
                format!(
                    "  {:<12} {}\n",
                    job.stage.as_str().yellow(),
                    job.fire_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            })
            .collect()
    }

    pub fn format_restore(report: &RestoreReport) -> String {
        format!(
            "{} {} jobs re-armed for {} discussions ({} stale, {} orphaned removed, {} missing)\n",
            "Schedule restored:".green().bold(),
            report.rearmed,
            report.discussions,
            report.stale_removed,
            report.orphaned_removed,
            report.unrecorded
        )
    }

    pub fn format_moderation(outcome: &ModerationOutcome) -> String {
        match outcome {
            ModerationOutcome::Recorded { pending } => {
                format!("{} {} pending\n", "Report recorded:".cyan().bold(), pending)
            }
            ModerationOutcome::Blocked { target, accepted } => format!(
                "{} {} ({} reports accepted)\n",
                "Blocked".red().bold(),
                target,
                accepted
            ),
        }
    }

    /// Format any result as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn status(status: DiscussionStatus) -> String {
        let label = status.as_str();
        match status {
            DiscussionStatus::Proposed => label.blue().to_string(),
            DiscussionStatus::Scheduled | DiscussionStatus::InProgress => {
                label.green().bold().to_string()
            }
            DiscussionStatus::Analyzing => label.yellow().to_string(),
            DiscussionStatus::Completed => label.cyan().to_string(),
            DiscussionStatus::Blocked => label.red().bold().to_string(),
        }
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
