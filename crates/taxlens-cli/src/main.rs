mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use taxlens_core::{
    BottomLine, CanonicalIncomeRecord, ComputedTaxResult, DEFAULT_TAX_YEAR, FilingStatus,
    IncomeReview, ParsedDocument, RULES, Section, StateCode, attribute, display_name,
};
use taxlens_sync::CalcClient;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taxlens", version, about = "Aggregate tax documents and explain the result")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fold parsed documents into a single income record.
    Aggregate {
        /// Parsed document JSON files (one document or an array per file)
        #[arg(required = true)]
        documents: Vec<PathBuf>,
        #[command(flatten)]
        selection: Selection,
        /// Print JSON instead of a card
        #[arg(long)]
        json: bool,
    },

    /// Attribute a computed result to the provisions that produced it.
    Explain {
        /// Computed result JSON file
        result: PathBuf,
        #[arg(long, default_value = "CA", env = "TAXLENS_STATE")]
        state: StateCode,
        #[arg(long)]
        json: bool,
    },

    /// Aggregate, submit to the computation service and explain the result.
    Calculate {
        #[arg(required = true)]
        documents: Vec<PathBuf>,
        #[command(flatten)]
        selection: Selection,
        /// Computation service base URL
        #[arg(long, default_value = "http://localhost:8000", env = "TAXLENS_ENDPOINT")]
        endpoint: String,
        #[arg(long)]
        json: bool,
    },

    /// List the attribution rules in evaluation order.
    Rules {
        #[arg(long, default_value = "CA", env = "TAXLENS_STATE")]
        state: StateCode,
    },
}

#[derive(Args)]
struct Selection {
    #[arg(long, default_value_t = DEFAULT_TAX_YEAR, env = "TAXLENS_TAX_YEAR")]
    tax_year: i32,
    /// single or joint
    #[arg(long, default_value = "single", env = "TAXLENS_FILING_STATUS")]
    filing_status: FilingStatus,
    /// Two-letter state code
    #[arg(long, default_value = "CA", env = "TAXLENS_STATE")]
    state: StateCode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Aggregate {
            documents,
            selection,
            json,
        } => {
            let review = load_review(&documents, &selection)?;
            if json {
                print_json(&AggregateReport::new(&review))?;
            } else {
                display::print_documents(review.documents());
                display::print_record_card(review.record());
            }
        }
        Command::Explain {
            result,
            state,
            json,
        } => {
            let text = std::fs::read_to_string(&result)
                .with_context(|| format!("reading {}", result.display()))?;
            let computed: ComputedTaxResult = serde_json::from_str(&text)
                .with_context(|| format!("parsing computed result {}", result.display()))?;
            explain(&computed, state, json)?;
        }
        Command::Calculate {
            documents,
            selection,
            endpoint,
            json,
        } => {
            let review = load_review(&documents, &selection)?;
            let client = CalcClient::new(endpoint);
            let computed = client
                .calculate(review.calculation_request())
                .await
                .with_context(|| format!("calculating via {}", client.base_url()))?;
            if !json {
                display::print_record_card(review.record());
            }
            explain(&computed, review.record().state, json)?;
        }
        Command::Rules { state } => {
            for rule in RULES {
                println!(
                    "  {:<28} {:<10} {}",
                    rule.id,
                    format!("{:?}", rule.kind).to_lowercase(),
                    rule.section.title(state)
                );
            }
        }
    }

    Ok(())
}

fn explain(computed: &ComputedTaxResult, state: StateCode, json: bool) -> anyhow::Result<()> {
    let sections = attribute(computed, state).context("attributing computed result")?;
    info!(
        sections = sections.len(),
        entries = sections.iter().map(|s| s.entries.len()).sum::<usize>(),
        "attribution built"
    );
    if json {
        print_json(&Explanation {
            generated_at: chrono::Utc::now().to_rfc3339(),
            state,
            sections: &sections,
            bottom_line: computed.bottom_line(),
        })?;
    } else {
        display::print_sections(&sections);
        display::print_summary(computed, state);
    }
    Ok(())
}

// ── Document loading ──

/// A document file holds either one parsed document or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Many(Vec<ParsedDocument>),
    One(ParsedDocument),
}

fn read_documents(path: &Path) -> anyhow::Result<Vec<ParsedDocument>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: DocumentFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing documents in {}", path.display()))?;
    let mut docs = match file {
        DocumentFile::Many(docs) => docs,
        DocumentFile::One(doc) => vec![doc],
    };
    let fallback = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for doc in &mut docs {
        if doc.filename.is_empty() {
            doc.filename = fallback.clone();
        }
    }
    Ok(docs)
}

fn load_review(paths: &[PathBuf], selection: &Selection) -> anyhow::Result<IncomeReview> {
    let mut review =
        IncomeReview::with_selection(selection.tax_year, selection.filing_status, selection.state);
    for path in paths {
        for doc in read_documents(path)? {
            review.add_document(doc);
        }
    }
    info!(
        documents = review.documents().len(),
        tax_year = review.record().tax_year,
        "documents aggregated"
    );
    Ok(review)
}

// ── JSON output ──

#[derive(Serialize)]
struct DocumentSummary<'a> {
    filename: &'a str,
    name: String,
    form_type: &'a str,
    parse_confidence: &'static str,
}

#[derive(Serialize)]
struct AggregateReport<'a> {
    generated_at: String,
    documents: Vec<DocumentSummary<'a>>,
    record: &'a CanonicalIncomeRecord,
}

impl<'a> AggregateReport<'a> {
    fn new(review: &'a IncomeReview) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            documents: review
                .documents()
                .iter()
                .map(|doc| DocumentSummary {
                    filename: &doc.filename,
                    name: display_name(doc),
                    form_type: doc.form_type.as_str(),
                    parse_confidence: doc.parse_confidence.as_str(),
                })
                .collect(),
            record: review.record(),
        }
    }
}

#[derive(Serialize)]
struct Explanation<'a> {
    generated_at: String,
    state: StateCode,
    sections: &'a [Section],
    bottom_line: BottomLine,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
