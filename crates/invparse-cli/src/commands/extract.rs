//! Extract command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use invparse_core::{AnalyzerClient, Error, ExtractionOutcome, InvoicePipeline};

use super::open_db;

pub async fn cmd_extract(db_path: &Path, file: &Path, no_save: bool) -> Result<()> {
    let analyzer = AnalyzerClient::from_env().context("Failed to configure document analyzer")?;

    let pipeline = if no_save {
        InvoicePipeline::without_storage(analyzer)
    } else {
        InvoicePipeline::new(analyzer, open_db(db_path)?)
    };

    let outcome = extract_file(&pipeline, file).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.extraction)
            .context("Failed to serialize extraction")?
    );

    match (&outcome.saved_invoice_id, no_save) {
        (_, true) => eprintln!("ℹ️  Not stored (--no-save)"),
        (Some(id), false) => eprintln!("✅ Stored invoice {}", id),
        (None, false) => eprintln!("⚠️  Invoice not stored (no InvoiceId, or storage failed)"),
    }

    Ok(())
}

/// Read a document from disk and run it through the pipeline
pub async fn extract_file(pipeline: &InvoicePipeline, file: &Path) -> Result<ExtractionOutcome> {
    let document = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if document.is_empty() {
        bail!("{} is empty", file.display());
    }

    debug!(
        file = %file.display(),
        sha256 = %hex::encode(Sha256::digest(&document)),
        "Read document"
    );

    match pipeline.extract(&document).await {
        Ok(outcome) => Ok(outcome),
        Err(Error::RemoteUnavailable(reason)) => {
            bail!("Document analysis service unavailable: {}", reason)
        }
        Err(Error::LowConfidence(confidence)) => bail!(
            "Invalid document: invoice confidence {:.3} is below {}",
            confidence,
            invparse_core::CONFIDENCE_THRESHOLD
        ),
        Err(e) => Err(e.into()),
    }
}
