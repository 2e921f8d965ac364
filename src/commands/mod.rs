use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use crate::error::RagError;
use crate::pipeline::RagPipeline;

mod document;
mod system;

pub use system::print_help;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Routes REPL input to document, system or question handling.
pub struct CommandHandler {
    pipeline: Arc<RagPipeline>,
}

impl CommandHandler {
    pub fn new(pipeline: Arc<RagPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<Flow, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "status" => return document::show_status(&self.pipeline).map(|_| Flow::Continue),
            "upload" => {
                return document::handle_upload("", &self.pipeline)
                    .await
                    .map(|_| Flow::Continue)
            }
            _ => {}
        }

        if let Some(path) = input.strip_prefix("upload ") {
            document::handle_upload(path, &self.pipeline).await?;
            return Ok(Flow::Continue);
        }

        // Anything else is a question about the indexed documents
        self.handle_question(input).await?;
        Ok(Flow::Continue)
    }

    async fn handle_question(&self, query: &str) -> Result<(), String> {
        let pb = spinner("Analyzing document...");
        let result = self.pipeline.ask(query).await;
        pb.finish_and_clear();

        match result {
            Ok(answer) => {
                println!("🤖 {}", answer.truecolor(255, 236, 179));
                println!();
                Ok(())
            }
            Err(RagError::EmptyIndex) => {
                Err("No document indexed yet. Use 'upload <file.pdf>' first.".to_string())
            }
            Err(e) => Err(format!("Failed to get AI response: {}", e)),
        }
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
