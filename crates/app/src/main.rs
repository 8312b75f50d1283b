use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine as _;
use clap::Parser;
use serde::Serialize;

use concordia_core::{AuditResult, ExtractionData, ReconciliationEngine};
use concordia_report::CertificateRenderer;

/// Audit an extracted trade-document snapshot and render its certificate.
///
/// The snapshot (commercial invoice + packing list + bill of lading) must
/// already be extracted to JSON; document reading is a separate concern.
#[derive(Parser, Debug)]
#[command(name = "concordia", version, about)]
struct Args {
    /// Path to the extraction snapshot (JSON).
    snapshot: PathBuf,

    /// Write the audit certificate PDF to this path.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Emit the full audit response (snapshot, outcome, base64 report)
    /// as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Organization name printed on the certificate.
    #[arg(long, default_value = "CONCORDIA TRADE AUDIT")]
    organization: String,
}

/// What an upstream transport would hand back to its caller: the snapshot,
/// the outcome, and the certificate as base64.
#[derive(Debug, Serialize)]
struct AuditResponse {
    data: ExtractionData,
    passed: bool,
    errors: Vec<String>,
    report_base64: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read snapshot {}", args.snapshot.display()))?;
    let data = ExtractionData::from_json(&text)
        .with_context(|| format!("snapshot {} rejected", args.snapshot.display()))?;

    let AuditResult { data, discrepancies, passed } = ReconciliationEngine::default().audit(data);

    let pdf = CertificateRenderer::new(args.organization.as_str())
        .render(&data, &discrepancies)
        .context("certificate rendering failed")?;

    if let Some(path) = &args.report {
        fs::write(path, &pdf)
            .with_context(|| format!("failed to write certificate {}", path.display()))?;
        tracing::info!("Certificate written: {}", path.display());
    }

    if args.json {
        let response = AuditResponse {
            report_base64: Some(base64::engine::general_purpose::STANDARD.encode(&pdf)),
            data,
            passed,
            errors: discrepancies,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if passed {
        tracing::info!("Audit passed: documents are consistent");
    } else {
        tracing::warn!("Audit failed with {} discrepancy(ies)", discrepancies.len());
        for message in &discrepancies {
            println!("- {message}");
        }
    }
    Ok(())
}
