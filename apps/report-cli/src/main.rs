//! Report generator binary
//!
//! Runs one report end to end: generate sections, order them against the
//! spreadsheet backbone and merge everything into a single PDF.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use knowledge_index::KnowledgeIndex;
use report_core::{
    DirectorySheetSource, ReportAssembler, ReportConfig, ReportPipeline, SectionManifest,
    SpreadsheetOrder,
};
use section_writer::{ChatCompletionsService, SectionContentGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "report-cli")]
#[command(version, about = "Generate a merged PDF report from spreadsheet pages and generated sections")]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding one PDF per spreadsheet sheet
    #[arg(long)]
    sheets_dir: PathBuf,

    /// Section manifest (JSON)
    #[arg(long)]
    manifest: PathBuf,

    /// Sheet order (JSON)
    #[arg(long)]
    order: PathBuf,

    /// Dataset passed to every section prompt (JSON)
    #[arg(long)]
    data: PathBuf,

    /// Knowledge base snapshot to load
    #[arg(long)]
    knowledge_snapshot: Option<PathBuf>,

    /// Reference PDF to index; may be repeated
    #[arg(long = "reference-pdf")]
    reference_pdfs: Vec<PathBuf>,

    /// Output PDF path
    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the diagnostics summary, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting report-cli v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };

    let manifest = SectionManifest::from_json(&read(&args.manifest)?)?;
    let order = SpreadsheetOrder::from_json(&read(&args.order)?)?;
    let dataset: serde_json::Value = serde_json::from_str(&read(&args.data)?)
        .with_context(|| format!("Invalid dataset JSON: {}", args.data.display()))?;

    let api_key = config.service.api_key()?;
    let service = ChatCompletionsService::new(config.service.to_service_config(api_key))
        .context("Failed to build generation client")?;
    tracing::info!(endpoint = service.endpoint(), model = service.model(), "generation service ready");

    let sheets = DirectorySheetSource::open(&args.sheets_dir)?;
    let assembler = ReportAssembler::with_typst(sheets, config.assembly.clone());
    let generator = SectionContentGenerator::with_config(service, config.generation.clone());

    let mut pipeline = ReportPipeline::new(generator, assembler);
    if let Some(index) = load_knowledge(&config, &args)? {
        pipeline = pipeline.with_knowledge(index);
    }

    let report = pipeline.run_validated(&order, &manifest, &dataset)?;
    report.write_to(&args.output)?;

    println!("{}", serde_json::to_string_pretty(&report.diagnostics)?);
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Build the knowledge index from a snapshot and/or reference PDFs
fn load_knowledge(config: &ReportConfig, args: &Args) -> anyhow::Result<Option<KnowledgeIndex>> {
    if args.knowledge_snapshot.is_none() && args.reference_pdfs.is_empty() {
        return Ok(None);
    }

    let mut index = match &args.knowledge_snapshot {
        Some(path) => KnowledgeIndex::load_snapshot(config.index, path)
            .with_context(|| format!("Failed to load knowledge snapshot {}", path.display()))?,
        None => KnowledgeIndex::new(config.index)?,
    };

    for path in &args.reference_pdfs {
        let source_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match index.ingest_pdf(&source_id, path) {
            Ok(chunks) => tracing::info!(source = %source_id, chunks, "indexed reference document"),
            Err(e) => tracing::warn!(source = %source_id, "skipping reference document: {}", e),
        }
    }

    let stats = index.stats();
    tracing::info!(
        sources = stats.sources,
        pages = stats.total_pages,
        chunks = stats.total_chunks,
        "knowledge base ready"
    );
    Ok(Some(index))
}
