use anyhow::{Context, Result};
use dotenv::dotenv;
use financial_report_analyst::{DocumentSession, OpenAiClient, ScanOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
    let path = std::env::args()
        .nth(1)
        .context("usage: scan_reports <file.xlsx|file.xls|file.pdf>")?;

    let client = OpenAiClient::new(api_key);
    let mut session = DocumentSession::open_path(&path)?;

    println!("🔎 Escaneando '{}'...\n", session.filename());

    match session.scan(&client).await {
        ScanOutcome::Reports(reports) => {
            println!("Se encontraron {} reportes posibles:\n", reports.len());
            for report in &reports {
                println!(
                    "  {}. {} ({}) - {}",
                    report.id, report.title, report.location, report.description
                );
            }
        }
        ScanOutcome::Unstructured { raw, error } => {
            match error {
                Some(error) => {
                    eprintln!("No se pudo procesar la lista de reportes: {}", error)
                }
                None => eprintln!("No se pudo estructurar la lista de reportes automáticamente."),
            }
            println!("\n{}", raw);
        }
    }

    Ok(())
}
