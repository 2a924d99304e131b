//! Subcommand implementations. Every command prints one JSON document.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use squircle_cache::codec;
use squircle_cache::{
    BlobRole, CacheConfig, DocumentModel, DocumentRegistry, EditRecord, EditStack,
    JsonFileRegistry, StackStore,
};

use crate::error::{CliError, Result};

type Store = StackStore<JsonFileRegistry>;

fn open_store(config: &CacheConfig) -> Store {
    StackStore::new(
        config.cache_dir.clone(),
        JsonFileRegistry::new(config.registry_path.clone()),
    )
    .with_file_params(config.file_params())
    .with_stack_config(config.stack_config())
}

fn emit<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Records from top of stack down, the order an undo would replay them.
fn top_first(stack: &EditStack) -> Vec<&EditRecord> {
    stack.iter().rev().collect()
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    id: &'a str,
    cached: bool,
    document: Option<DocumentModel>,
    blobs: Vec<BlobStatus>,
    undo: Vec<&'a EditRecord>,
    redo: Vec<&'a EditRecord>,
}

#[derive(Debug, Serialize)]
struct BlobStatus {
    role: BlobRole,
    path: String,
    exists: bool,
}

pub fn run_inspect(config: &CacheConfig, id: &str, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config);
    let undo = store.load_undo_stack(id)?;
    let redo = store.load_redo_stack(id)?;
    let blobs = BlobRole::ALL
        .into_iter()
        .map(|role| {
            let path = store.blob_path(id, role);
            BlobStatus {
                role,
                exists: path.exists(),
                path: path.display().to_string(),
            }
        })
        .collect();

    let report = InspectReport {
        id,
        cached: store.is_cached(id),
        document: store.registry().get(id)?,
        blobs,
        undo: top_first(&undo),
        redo: top_first(&redo),
    };
    emit(out, &report)
}

#[derive(Debug, Serialize)]
struct DecodeReport<'a> {
    file: String,
    depth: usize,
    records: Vec<&'a EditRecord>,
}

pub fn run_decode(file: &Path, out: &mut dyn Write) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let stack = codec::decode(&raw).map_err(|source| CliError::Codec {
        path: file.to_path_buf(),
        source,
    })?;
    let report = DecodeReport {
        file: file.display().to_string(),
        depth: stack.len(),
        records: top_first(&stack),
    };
    emit(out, &report)
}

#[derive(Debug, Serialize)]
struct DeleteReport<'a> {
    id: &'a str,
    was_cached: bool,
    was_registered: bool,
}

pub fn run_delete(config: &CacheConfig, id: &str, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config);
    let registered = store.registry().get(id)?;
    let was_registered = registered.is_some();
    let document = registered.unwrap_or_else(|| DocumentModel::new(id, "", ""));
    let was_cached = store.is_cached(id);

    store.delete_cache(&document)?;
    tracing::info!(document_id = id, was_cached, was_registered, "deleted document cache");
    emit(
        out,
        &DeleteReport {
            id,
            was_cached,
            was_registered,
        },
    )
}

#[derive(Debug, Serialize)]
struct ClearReport {
    cache_dir: String,
    removed: usize,
}

pub fn run_clear(config: &CacheConfig, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config);
    let removed = store.delete_all_caches();
    emit(
        out,
        &ClearReport {
            cache_dir: config.cache_dir.display().to_string(),
            removed,
        },
    )
}

#[derive(Debug, Serialize)]
struct ListEntry {
    #[serde(flatten)]
    document: DocumentModel,
    cached: bool,
}

pub fn run_list(config: &CacheConfig, out: &mut dyn Write) -> Result<()> {
    let store = open_store(config);
    let entries: Vec<ListEntry> = store
        .registry()
        .list()?
        .into_iter()
        .map(|document| ListEntry {
            cached: store.is_cached(&document.uuid),
            document,
        })
        .collect();
    emit(out, &entries)
}
