//! Archive ingestion service: an HTTP API and a CLI over one
//! [`ingest_store::ProjectStore`].

pub mod cli;
pub mod config;
pub mod http;
