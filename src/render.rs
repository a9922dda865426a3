//! Plain-text rendering of a [`ViewState`], one function per tab.

use std::fmt::Write;

use crate::view::{Notice, NoticeLevel, Tab, ViewState};

const FILE_PREVIEW: usize = 5;

/// `0 Bytes`, `1.5 KB`, `2.25 MB`, ...
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let k = 1024f64;
    let b = bytes as f64;
    let i = ((b.ln() / k.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = b / k.powi(i as i32);
    let rounded = (value * 100.0).round() / 100.0;
    // Trailing zeros are dropped: 1.50 → 1.5, 2.00 → 2
    format!("{} {}", rounded, UNITS[i])
}

/// `0.9123` → `91.23%`
pub fn format_similarity(similarity: f64) -> String {
    format!("{:.2}%", similarity * 100.0)
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("ok: {}", notice.text),
        NoticeLevel::Error => format!("error: {}", notice.text),
    }
}

pub fn render_tabs(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{}]", t.label())
            } else {
                format!(" {} ", t.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render(state: &ViewState, accepted_extensions: &[String]) -> String {
    let mut out = render_tabs(state.tab);
    out.push_str("\n\n");
    out.push_str(&match state.tab {
        Tab::Upload => render_upload(state, accepted_extensions),
        Tab::Search => render_search(state),
        Tab::Manage => render_manage(state),
        Tab::Stats => render_stats(state),
    });
    out
}

pub fn render_upload(state: &ViewState, accepted_extensions: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Knowledge base: {}", state.selected_knowledge_base);
    if !state.knowledge_bases.is_empty() {
        let names: Vec<&str> = state.knowledge_bases.iter().map(|k| k.name.as_str()).collect();
        let _ = writeln!(out, "Available:      {}", names.join(", "));
    }

    if !state.selected_files.is_empty() {
        let _ = writeln!(out, "Selected: {} file(s)", state.selected_files.len());
        for f in state.selected_files.iter().take(FILE_PREVIEW) {
            let _ = writeln!(out, "  - {} ({})", f.name, format_file_size(f.size));
        }
        if state.selected_files.len() > FILE_PREVIEW {
            let _ = writeln!(
                out,
                "  and {} more...",
                state.selected_files.len() - FILE_PREVIEW
            );
        }
    }

    if state.uploading {
        let _ = writeln!(out, "Uploading...");
    }
    if let Some(msg) = &state.upload_message {
        let _ = writeln!(out, "{}", render_notice(msg));
    }

    let _ = writeln!(out, "Supported file types: {}", accepted_extensions.join(" "));
    out
}

pub fn render_search(state: &ViewState) -> String {
    let mut out = String::new();
    if state.searching {
        let _ = writeln!(out, "Searching...");
    }
    if state.search_results.is_empty() {
        let _ = writeln!(out, "No results.");
        return out;
    }
    let _ = writeln!(out, "Search Results ({})", state.search_results.len());
    for (i, r) in state.search_results.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}. {} ({})  similarity: {}  chunk: {}",
            i + 1,
            r.filename,
            r.file_type,
            format_similarity(r.similarity),
            r.chunk_index
        );
        for line in r.chunk_text.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn render_manage(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Knowledge Bases ({})", state.knowledge_bases.len());
    for kb in &state.knowledge_bases {
        let _ = writeln!(out, "  {}", kb.name);
        if let Some(desc) = kb.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    {}", desc);
        }
        let _ = writeln!(
            out,
            "    schema: {} | created: {}",
            kb.schema_name,
            kb.created_at.format("%Y-%m-%d")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Documents ({})", state.documents.len());
    for doc in &state.documents {
        let _ = writeln!(out, "  {}  {}", doc.id, doc.filename);
        let _ = writeln!(
            out,
            "    type: {} | size: {} | uploaded: {}",
            doc.file_type,
            format_file_size(doc.file_size),
            doc.created_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn render_stats(state: &ViewState) -> String {
    match &state.stats {
        Some(stats) => format!(
            "Collection:    {}\nTotal vectors: {}\n",
            stats.vectorstore.collection, stats.vectorstore.total_vectors
        ),
        None => "Statistics not loaded.\n".to_string(),
    }
}
