pub mod app;
pub mod auth;
pub mod cli;
pub mod console;
pub mod error;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

use app::ChatApp;
use cli::Args;
use console::Console;
use log::info;
use std::error::Error;
use tokio::io::{ stdin, stdout, BufReader };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Store Type: {}", args.store_type);
    info!("User File: {}", args.user_file);
    info!("Chat File: {}", args.chat_file);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Tesseract Command: {}", args.tesseract_cmd);
    info!("OCR Language: {}", args.ocr_lang.as_deref().unwrap_or("tesseract default"));
    info!("Minimum Password Length: {}", args.min_password_len);
    info!("-------------------------");

    let mut app = ChatApp::new(&args)?;
    let mut console = Console::new(BufReader::new(stdin()), stdout());
    console.run(&mut app).await?;

    app.log_out();
    Ok(())
}
