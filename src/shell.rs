//! Interactive line-oriented front end over one long-lived [`View`].
//!
//! Network actions are spawned onto the runtime so the prompt keeps
//! accepting input while requests are outstanding. Notices produced by
//! finished actions are printed before the next prompt.
//!
//! ```text
//! ragkb> select support-docs
//! ragkb> files ./docs/refunds.md ./docs/shipping.pdf
//! ragkb> upload
//! ragkb> search refund policy
//! ragkb> tab search
//! ragkb> show
//! ```

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::confirm::Always;
use crate::models::SelectedFile;
use crate::render::{render, render_notice};
use crate::view::{Tab, View};

const HELP: &str = "\
commands:
  tab <upload|search|manage|stats>   switch tab (no network)
  select <knowledge-base>            target for uploads and searches
  files <path>...                    choose files to upload
  upload                             upload the selected files
  query <text>                       set the search query
  search [text]                      search (optionally setting the query)
  create <name> [description]        create a knowledge base
  delete-kb <name>                   delete a knowledge base
  delete-doc <id>                    delete a document
  show                               render the active tab
  help                               this text
  quit                               leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Tab(Tab),
    Select(String),
    Files(Vec<PathBuf>),
    Upload,
    Query(String),
    Search(Option<String>),
    Create { name: String, description: String },
    DeleteKnowledgeBase(String),
    DeleteDocument(String),
    Show,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((h, r)) => (h, r.trim()),
            None => (line, ""),
        };

        let require = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("usage: {} <{}>", head, what))
            } else {
                Ok(rest.to_string())
            }
        };

        Ok(match head {
            "" => ShellCommand::Empty,
            "tab" => ShellCommand::Tab(require("tab")?.parse()?),
            "select" => ShellCommand::Select(require("knowledge-base")?),
            "files" => ShellCommand::Files(
                require("path")?
                    .split_whitespace()
                    .map(PathBuf::from)
                    .collect(),
            ),
            "upload" => ShellCommand::Upload,
            "query" => ShellCommand::Query(rest.to_string()),
            "search" if rest.is_empty() => ShellCommand::Search(None),
            "search" => ShellCommand::Search(Some(rest.to_string())),
            "create" => {
                let args = require("name")?;
                let (name, description) = match args.split_once(char::is_whitespace) {
                    Some((n, d)) => (n.to_string(), d.trim().to_string()),
                    None => (args, String::new()),
                };
                ShellCommand::Create { name, description }
            }
            "delete-kb" => ShellCommand::DeleteKnowledgeBase(require("name")?),
            "delete-doc" => ShellCommand::DeleteDocument(require("id")?),
            "show" => ShellCommand::Show,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        })
    }
}

pub async fn run_shell(view: Arc<View>, accepted_extensions: Vec<String>) -> Result<()> {
    view.activate().await;
    println!("{}", render(&view.snapshot(), &accepted_extensions));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        for notice in view.take_notices() {
            println!("{}", render_notice(&notice));
        }
        prompt("ragkb> ").await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match ShellCommand::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => break,
            ShellCommand::Show => println!("{}", render(&view.snapshot(), &accepted_extensions)),
            ShellCommand::Tab(tab) => {
                view.select_tab(tab);
                println!("{}", render(&view.snapshot(), &accepted_extensions));
            }
            ShellCommand::Select(name) => view.select_knowledge_base(name),
            ShellCommand::Files(paths) => {
                let mut files = Vec::with_capacity(paths.len());
                for path in &paths {
                    match SelectedFile::from_path(path).await {
                        Ok(f) => files.push(f),
                        Err(e) => println!("skipping {}: {}", path.display(), e),
                    }
                }
                view.select_files(files);
            }
            ShellCommand::Upload => {
                if let Some(pending) = view.prepare_upload() {
                    let view = view.clone();
                    tokio::spawn(async move { view.run_upload(pending).await });
                } else if let Some(msg) = view.snapshot().upload_message {
                    println!("{}", render_notice(&msg));
                }
            }
            ShellCommand::Query(q) => view.set_query(q),
            ShellCommand::Search(q) => {
                if let Some(q) = q {
                    view.set_query(q);
                }
                if let Some(pending) = view.prepare_search() {
                    let view = view.clone();
                    tokio::spawn(async move { view.run_search(pending).await });
                }
            }
            ShellCommand::Create { name, description } => {
                view.set_new_knowledge_base(name, description);
                let view = view.clone();
                tokio::spawn(async move { view.create_knowledge_base().await });
            }
            ShellCommand::DeleteKnowledgeBase(name) => {
                let question = format!("Delete knowledge base \"{}\"?", name);
                let yes = ask(&mut lines, &question).await?;
                let view = view.clone();
                tokio::spawn(async move {
                    view.delete_knowledge_base_with(&name, &Always(yes)).await
                });
            }
            ShellCommand::DeleteDocument(id) => {
                let yes = ask(&mut lines, "Delete this document?").await?;
                let view = view.clone();
                tokio::spawn(async move { view.delete_document_with(&id, &Always(yes)).await });
            }
        }
    }
    Ok(())
}

async fn prompt(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// The shell owns stdin, so confirmation is read here rather than through
/// the terminal gate.
async fn ask(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool> {
    prompt(&format!("{} [y/N] ", question)).await?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
