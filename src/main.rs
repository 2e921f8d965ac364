use clap::Parser;
use colored::Colorize;
use docu_mind::api;
use docu_mind::commands::{self, CommandHandler, Flow};
use docu_mind::config::{ProviderKind, RagConfig};
use docu_mind::pipeline::{PipelineFactory, RagPipeline};
use docu_mind::RagResult;
use dotenv::dotenv;
use log::info;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Chat with your PDF documents", long_about = None)]
struct Args {
    /// Backend for both embeddings and generation (ollama or openai)
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Generation model
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Serve the HTTP API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// PDF to index before the prompt starts
    file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut RagConfig) {
        if let Some(kind) = self.provider {
            for backend in [&mut config.embedding, &mut config.generation] {
                backend.kind = kind;
                backend.base_url = kind.default_base_url().to_string();
                if kind == ProviderKind::OpenAI && backend.api_key.is_none() {
                    backend.api_key = std::env::var("OPENAI_API_KEY").ok();
                }
            }
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.embedding.base_url = base_url.clone();
            config.generation.base_url = base_url.clone();
        }
        if let Some(dir) = &self.storage_dir {
            config.storage_dir = dir.clone();
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(size) = self.chunk_size {
            config.chunk.max_len = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunk.overlap = overlap;
        }
    }
}

/// Environment first, then flags, then a single validation pass.
fn load_config(args: &Args) -> RagResult<RagConfig> {
    let mut config = RagConfig::from_env()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = load_config(&args)?;

    info!(
        "Using {} for generation ({}) and {} for embeddings ({})",
        config.generation.kind.as_str(),
        config.generation.model,
        config.embedding.kind.as_str(),
        config.embedding.model
    );

    if args.api {
        let factory = PipelineFactory::from_config(config)?;
        api::serve(factory, args.port).await
    } else {
        run_cli_mode(&args, &config).await
    }
}

async fn run_cli_mode(args: &Args, config: &RagConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", "📘 DocuMind AI".bright_cyan().bold());
    println!("{}", "Your Intelligent Document Assistant".cyan());

    let pipeline = Arc::new(RagPipeline::from_config(config)?);
    let mut command_handler = CommandHandler::new(pipeline);

    commands::print_help();

    if let Some(file) = &args.file {
        let command = format!("upload {}", file.display());
        if let Err(e) = command_handler.handle_command(&command).await {
            println!("{}", e.red());
        }
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                if !input.is_empty() {
                    let _ = rl.add_history_entry(input);
                }

                match command_handler.handle_command(input).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
