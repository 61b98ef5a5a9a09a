use anyhow::{Context, Result};
use dotenv::dotenv;
use financial_report_analyst::{
    export_bytes, export_filename, DocumentSession, OpenAiClient, SessionStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: analyze_report <file.xlsx|file.xls|file.pdf> [focus-title]")?;
    let focus = args.next();

    let client = OpenAiClient::new(api_key);
    let mut history = SessionStore::new();
    let mut session = DocumentSession::open_path(&path)?;

    match &focus {
        Some(focus) => println!("🎯 Enfoque seleccionado: {}", focus),
        None => println!("🌐 Se analizará todo el documento."),
    }
    session.select_focus(focus);

    println!("🤖 Analizando '{}'...\n", session.filename());
    let record = session.analyze(&client, &mut history).await;

    println!("{}\n", record.analysis_text);

    match (&record.structured_block, &record.structured_table) {
        (Some(block), Some(table)) => {
            println!("📋 Datos estructurados: {} filas extraídas.", table.row_count());
            let out_name = export_filename(&record.filename);
            std::fs::write(&out_name, export_bytes(block))?;
            println!("📥 CSV guardado como '{}'.", out_name);
        }
        (Some(block), None) => {
            println!("⚠️ Se encontró un bloque CSV pero no se pudo interpretar como tabla:");
            println!("{}", block);
            let out_name = export_filename(&record.filename);
            std::fs::write(&out_name, export_bytes(block))?;
            println!("📥 Bloque crudo guardado como '{}'.", out_name);
        }
        _ => println!("⚠️ No se encontró un bloque CSV en la respuesta del análisis."),
    }

    Ok(())
}
