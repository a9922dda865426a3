//! One-shot CLI commands.
//!
//! Each command opens a [`View`], performs one action through it, prints the
//! affected tab and any notices, and fails when an error notice was raised.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{HttpApi, RagApi};
use crate::config::Config;
use crate::confirm::{Always, Confirm, TerminalPrompt};
use crate::models::{KnowledgeBase, SelectedFile};
use crate::render::{render_manage, render_notice, render_search, render_stats, render_upload};
use crate::shell;
use crate::view::{Notice, View};

pub fn connect(config: &Config) -> Result<Arc<HttpApi>> {
    let api = HttpApi::new(&config.api).context("Failed to build HTTP client")?;
    Ok(Arc::new(api))
}

fn open_view(config: &Config, assume_yes: bool) -> Result<View> {
    let confirm: Arc<dyn Confirm> = if assume_yes {
        Arc::new(Always(true))
    } else {
        Arc::new(TerminalPrompt)
    };
    let api: Arc<dyn RagApi> = connect(config)?;
    Ok(View::new(api, &config.view, confirm))
}

/// Print notices; the first error notice becomes the command's error.
fn finish(view: &View) -> Result<()> {
    let notices = view.take_notices();
    let mut first_error: Option<Notice> = None;
    for notice in notices {
        if notice.is_error() {
            eprintln!("{}", render_notice(&notice));
            first_error.get_or_insert(notice);
        } else {
            println!("{}", render_notice(&notice));
        }
    }
    match first_error {
        Some(notice) => bail!(notice.text),
        None => Ok(()),
    }
}

fn print_knowledge_bases(knowledge_bases: &[KnowledgeBase]) {
    for kb in knowledge_bases {
        let desc = kb.description.as_deref().unwrap_or("");
        println!("{:<24} {:<24} {}", kb.name, kb.schema_name, desc);
    }
    if knowledge_bases.is_empty() {
        println!("No knowledge bases.");
    }
}

pub async fn run_kb_list(config: &Config) -> Result<()> {
    let view = open_view(config, false)?;
    view.activate().await;
    print_knowledge_bases(&view.snapshot().knowledge_bases);
    finish(&view)
}

/// Creating refreshes only the knowledge-base list, so only that is shown.
pub async fn run_kb_create(config: &Config, name: &str, description: Option<String>) -> Result<()> {
    let view = open_view(config, false)?;
    view.set_new_knowledge_base(name, description.unwrap_or_default());
    view.create_knowledge_base().await;
    finish(&view)?;
    print_knowledge_bases(&view.snapshot().knowledge_bases);
    Ok(())
}

pub async fn run_kb_delete(config: &Config, name: &str, yes: bool) -> Result<()> {
    let view = open_view(config, yes)?;
    view.delete_knowledge_base(name).await;
    finish(&view)
}

pub async fn run_docs_list(config: &Config) -> Result<()> {
    let view = open_view(config, false)?;
    view.activate().await;
    let snap = view.snapshot();
    if snap.documents.is_empty() {
        println!("No documents.");
    } else {
        print!("{}", render_manage(&snap));
    }
    finish(&view)
}

pub async fn run_docs_delete(config: &Config, id: &str, yes: bool) -> Result<()> {
    let view = open_view(config, yes)?;
    view.delete_document(id).await;
    finish(&view)
}

pub async fn run_upload(config: &Config, paths: &[PathBuf], knowledge_base: Option<String>) -> Result<()> {
    let view = open_view(config, false)?;
    if let Some(kb) = knowledge_base {
        view.select_knowledge_base(kb);
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("Cannot select {}", path.display()))?;
        files.push(file);
    }
    view.select_files(files);
    view.upload().await;

    let snap = view.snapshot();
    print!("{}", render_upload(&snap, &config.view.accepted_extensions));
    match snap.upload_message {
        Some(msg) if msg.is_error() => bail!(msg.text),
        _ => finish(&view),
    }
}

pub async fn run_search(
    config: &Config,
    query: &str,
    knowledge_base: Option<String>,
    limit: Option<u32>,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(limit) = limit {
        config.view.search_limit = limit.max(1);
    }
    let view = open_view(&config, false)?;
    if let Some(kb) = knowledge_base {
        view.select_knowledge_base(kb);
    }
    view.set_query(query);
    view.search().await;
    finish(&view)?;
    print!("{}", render_search(&view.snapshot()));
    Ok(())
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let view = open_view(config, false)?;
    view.activate().await;
    let snap = view.snapshot();
    if snap.stats.is_none() {
        bail!("Failed to load statistics from {}", config.api.base_url);
    }
    print!("{}", render_stats(&snap));
    finish(&view)
}

pub async fn run_health(config: &Config) -> Result<()> {
    let api = connect(config)?;
    let health = api
        .health()
        .await
        .with_context(|| format!("Health check failed for {}", api.base_url()))?;
    println!("status: {}", health.status);
    for (key, value) in &health.details {
        println!("{}: {}", key, value);
    }
    Ok(())
}

pub async fn run_shell(config: &Config) -> Result<()> {
    // The shell reads its own confirmations, so the view's default gate is
    // never consulted.
    let view = open_view(config, false)?;
    shell::run_shell(Arc::new(view), config.view.accepted_extensions.clone()).await
}
