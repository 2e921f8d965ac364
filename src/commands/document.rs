use colored::Colorize;
use std::path::Path;

use crate::pipeline::RagPipeline;

use super::spinner;

pub async fn handle_upload(path: &str, pipeline: &RagPipeline) -> Result<(), String> {
    let path = path.trim();
    if path.is_empty() {
        println!("Please specify a PDF to upload.");
        println!("Usage: upload <file.pdf>");
        return Ok(());
    }

    println!("📄 Processing document: {}", path.bright_yellow());
    let pb = spinner("Indexing document...");
    let result = pipeline.ingest_path(Path::new(path)).await;
    pb.finish_and_clear();

    let report = result.map_err(|e| format!("Failed to process document: {}", e))?;

    println!(
        "✅ Document processed successfully! Ask your questions below. ({} pages, {} chunks)",
        report.pages.to_string().cyan(),
        report.chunks.to_string().cyan()
    );
    if report.chunks == 0 {
        println!("{}", "⚠️ No extractable text was found in this PDF.".yellow());
    }
    Ok(())
}

pub fn show_status(pipeline: &RagPipeline) -> Result<(), String> {
    let status = pipeline.status();

    println!("\n📚 Index Status:");
    println!("  Documents: {}", status.documents.to_string().cyan());
    println!("  Chunks:    {}", status.chunks.to_string().cyan());
    println!("  Embedding model: {}", status.embedding_model.bright_cyan());
    if let Some(dimension) = status.embedding_dimension {
        println!("  Vector size: {}", dimension.to_string().cyan());
    }
    println!("  Storage: {}", status.storage_dir.display());

    for report in &status.ingested {
        println!(
            "  • {} - {} pages, {} chunks",
            report.file_name.bright_yellow(),
            report.pages,
            report.chunks
        );
    }
    println!();
    Ok(())
}
