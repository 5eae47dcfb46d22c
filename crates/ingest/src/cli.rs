use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use ingest_store::ProjectStore;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::http;

#[derive(Clone, Debug, Parser)]
#[command(name = "ingest", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Configuration file [default: ingest.toml, if present]
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
    /// Storage root, overriding the configuration
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "s", name = "serve", about = "Run the HTTP service")]
    Serve(ServeArg),
    #[command(alias = "p", name = "projects", about = "List projects")]
    Projects,
    #[command(alias = "ls", name = "files", about = "List the files of a project")]
    Files(FilesArg),
    #[command(alias = "up", name = "upload", about = "Expand an archive into a project")]
    Upload(UploadArg),
    #[command(name = "save", about = "Store files in a project as-is")]
    Save(SaveArg),
    #[command(alias = "rm", name = "remove", about = "Delete a project, or one of its files")]
    Remove(RemoveArg),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArg {
    /// Listen address, overriding the configuration
    #[arg(long, short)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct FilesArg {
    pub project: String,
}

#[derive(Clone, Debug, Args)]
pub struct UploadArg {
    pub project: String,
    pub archive: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SaveArg {
    pub project: String,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct RemoveArg {
    pub project: String,
    /// Only this file; the whole project otherwise
    pub file: Option<String>,
}

impl App {
    /// Configuration with command-line overrides applied.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let file = match &self.config {
            Some(path) if !path.is_file() => bail!("config file {} not found", path.display()),
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        let mut config = Config::load(&file)
            .with_context(|| format!("failed to load configuration from {}", file.display()))?;

        if let Some(root) = &self.root {
            config.storage_root = root.clone();
        }
        if let Commands::Serve(ServeArg { bind: Some(bind) }) = &self.cmd {
            config.bind = bind.clone();
        }
        Ok(config)
    }
}

impl Commands {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        let store = ProjectStore::open(&config.storage_root, config.store_options())
            .with_context(|| format!("failed to open store at {}", config.storage_root.display()))?;

        match self {
            Commands::Serve(_) => {
                let app = http::router(store, config.max_upload_bytes);
                http::serve(&config.bind, app).await?;
            }
            Commands::Projects => {
                for name in store.list_projects()? {
                    println!("{name}");
                }
            }
            Commands::Files(arg) => {
                for name in store.list_files(&arg.project) {
                    println!("{name}");
                }
            }
            Commands::Upload(arg) => {
                let filename = arg
                    .archive
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("{} has no usable file name", arg.archive.display()))?
                    .to_string();
                let mut file = tokio::fs::File::open(&arg.archive)
                    .await
                    .with_context(|| format!("failed to open {}", arg.archive.display()))?;
                let report = store.upload_archive(&arg.project, &filename, &mut file).await?;
                print_json(&report)?;
            }
            Commands::Save(arg) => {
                let mut files = Vec::with_capacity(arg.files.len());
                for path in &arg.files {
                    let file = tokio::fs::File::open(path)
                        .await
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    files.push((path.to_string_lossy().into_owned(), file));
                }
                let report = store.save_files(&arg.project, files).await?;
                print_json(&report)?;
            }
            Commands::Remove(arg) => match arg.file {
                Some(file) => {
                    store.delete_file(&arg.project, &file)?;
                    info!(project = %arg.project, %file, "removed");
                }
                None => {
                    store.delete_project(&arg.project)?;
                    info!(project = %arg.project, "removed");
                }
            },
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
