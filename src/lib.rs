//! # ragkb
//!
//! Client-side orchestration for a RAG knowledge-base manager.
//!
//! ragkb drives a remote document/vector-store API: it uploads files into
//! named knowledge bases, runs semantic search, creates and deletes
//! knowledge bases and documents, and shows vector-store statistics. The
//! server does the ingestion and embedding; this crate coordinates the
//! calls and keeps an in-memory view consistent with the server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────┐   ┌───────────┐
//! │  CLI / shell │──▶│             View             │──▶│  RagApi   │
//! │   (ragkb)    │   │ tabs, selection, snapshots   │   │ (HTTP)    │
//! └──────────────┘   └──┬───────────┬───────────┬───┘   └─────▲─────┘
//!                       ▼           ▼           ▼             │
//!                ┌──────────┐ ┌──────────┐ ┌──────────┐       │
//!                │ Upload   │ │ Resource │ │ Refresh  │───────┘
//!                │ fan-out  │ │ clients  │ │ after    │
//!                └──────────┘ └──────────┘ └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire types |
//! | [`error`] | Client error type |
//! | [`api`] | Remote API trait and HTTP implementation |
//! | [`clients`] | Knowledge-base, document, search and stats clients |
//! | [`confirm`] | Yes/no gate for deletes |
//! | [`upload`] | Concurrent upload batches |
//! | [`refresh`] | Dependent re-reads after mutations |
//! | [`view`] | Tabbed view state machine |
//! | [`render`] | Plain-text rendering |
//! | [`shell`] | Interactive front end |
//! | [`commands`] | One-shot CLI commands |

pub mod api;
pub mod clients;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod models;
pub mod refresh;
pub mod render;
pub mod shell;
pub mod upload;
pub mod view;

#[cfg(test)]
mod testing;
