//! Application entry point: annotate plain text read from stdin.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build a document in the first configured language, one `<p>` per
//!    input line.
//! 4. Open the persisted cache store and the pinyin converter.
//! 5. Run one [`SessionRunner`] to completion.
//! 6. Print the annotated document as HTML.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use hanzi_ruby::{
    config::AppConfig,
    dom::{to_html, Document},
    resolve::{Converter, JsonFileStore, PinyinConverter},
    session::{PageEvent, SessionContext, SessionRunner},
};

/// Build the host document from `input`.
fn build_document(config: &AppConfig, input: &str) -> anyhow::Result<Document> {
    let lang = config.document.languages.first().map(String::as_str);
    let mut doc = Document::new(lang).with_url("stdin");
    let body = doc.body();

    for line in input.lines() {
        let p = doc.append_element(body, "p")?;
        if !line.is_empty() {
            doc.append_text(p, line)?;
        }
    }
    // Content present before the session starts is picked up by the initial
    // scan, not the watcher.
    doc.take_records();
    Ok(doc)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("hanzi-ruby starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Document
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading stdin")?;
    let doc = build_document(&config, &input)?.into_shared();

    // 4. Store + converter
    let store = JsonFileStore::open_default();
    log::debug!("cache store: {}", store.path().display());
    let converter: Arc<dyn Converter> = Arc::new(PinyinConverter::new());
    let session = SessionContext::new(&config, converter, Box::new(store));

    // 5. Session
    let (events_tx, events_rx) = mpsc::channel::<PageEvent>(16);
    let runner = tokio::spawn(SessionRunner::new(Arc::clone(&doc), session).run(events_rx));
    drop(events_tx);
    let summary = runner.await.context("session runner panicked")?;
    if !summary.started {
        log::warn!("document language not configured for annotation; output unchanged");
    }

    // 6. Output
    let html = {
        let doc = doc
            .lock()
            .map_err(|_| anyhow::anyhow!("document lock poisoned"))?;
        to_html(&doc, doc.root())
    };
    println!("{html}");
    Ok(())
}
