use clap::Subcommand;
use focuslog_core::mentor::{mentor_messages, report_messages};
use focuslog_core::{ActivityLog, Config, LlmClient};

use super::CmdResult;

#[derive(Subcommand)]
pub enum MentorAction {
    /// Ask a question about your recent sessions
    Ask {
        /// The question, as free text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Detailed feedback over the whole log
    Report,
}

pub async fn run(action: MentorAction) -> CmdResult {
    let config = Config::load_or_default();
    let log = ActivityLog::open()?;
    let mentor = &config.mentor;

    let messages = match action {
        MentorAction::Ask { question } => {
            let recent = log.recent(mentor.recent_window)?;
            mentor_messages(&recent, &question.join(" "), mentor.max_summary_chars)
        }
        MentorAction::Report => report_messages(&log.all()?, mentor.max_summary_chars)?,
    };

    let client = LlmClient::from_config(mentor)?;
    tracing::debug!(model = client.model(), messages = messages.len(), "asking mentor");
    let answer = client.chat_completion(&messages).await?;
    println!("{answer}");
    Ok(())
}
