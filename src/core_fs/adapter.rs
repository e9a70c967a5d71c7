//! Thin semantic view over the host filesystem.
//!
//! Operations return outcomes typed for the protocol layer; each command
//! handler maps them to the reply codes clients expect.

use std::fs::Metadata;
use std::io;
use std::path::Path;

use thiserror::Error;
use tokio::fs::{self, File};

#[derive(Debug, Error)]
pub enum FsError {
    #[error("no such file or directory")]
    NotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("not a regular file")]
    NotAFile,
    #[error("already exists")]
    AlreadyExists,
    #[error("{0}")]
    Io(io::Error),
}

/// A named directory entry paired with its metadata.
#[derive(Debug)]
pub struct DirEntry {
    pub name: String,
    pub metadata: Metadata,
}

pub async fn stat(path: &Path) -> Result<Metadata, FsError> {
    fs::metadata(path).await.map_err(classify)
}

/// Reads a directory, returning its entries sorted by name.
pub async fn read_dir_sorted(path: &Path) -> Result<Vec<DirEntry>, FsError> {
    let meta = stat(path).await?;
    if !meta.is_dir() {
        return Err(FsError::NotADirectory);
    }

    let mut dir = fs::read_dir(path).await.map_err(classify)?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await.map_err(classify)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = entry.metadata().await.map_err(classify)?;
        entries.push(DirEntry { name, metadata });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Opens an existing regular file for reading.
pub async fn open_file(path: &Path) -> Result<File, FsError> {
    let meta = stat(path).await?;
    if !meta.is_file() {
        return Err(FsError::NotAFile);
    }
    File::open(path).await.map_err(classify)
}

/// Creates (or truncates) a regular file for writing.
pub async fn create_file(path: &Path) -> Result<File, FsError> {
    File::create(path).await.map_err(classify)
}

/// Creates a directory. The parent must already exist and be a directory.
pub async fn make_dir(path: &Path) -> Result<(), FsError> {
    let parent = path.parent().ok_or(FsError::NotFound)?;
    let parent_meta = stat(parent).await?;
    if !parent_meta.is_dir() {
        return Err(FsError::NotADirectory);
    }

    match fs::create_dir(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Err(FsError::AlreadyExists),
        Err(err) => Err(classify(err)),
    }
}

/// Deletes a regular file.
pub async fn remove_file(path: &Path) -> Result<(), FsError> {
    let meta = stat(path).await?;
    if meta.is_dir() {
        return Err(FsError::NotAFile);
    }
    fs::remove_file(path).await.map_err(classify)
}

/// Recursively deletes a directory tree.
pub async fn remove_dir_all(path: &Path) -> Result<(), FsError> {
    let meta = stat(path).await?;
    if !meta.is_dir() {
        return Err(FsError::NotADirectory);
    }
    fs::remove_dir_all(path).await.map_err(classify)
}

/// Reports the byte length of a regular file.
pub async fn file_size(path: &Path) -> Result<u64, FsError> {
    let meta = stat(path).await?;
    if !meta.is_file() {
        return Err(FsError::NotAFile);
    }
    Ok(meta.len())
}

fn classify(err: io::Error) -> FsError {
    match err.kind() {
        io::ErrorKind::NotFound => FsError::NotFound,
        io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
        _ => FsError::Io(err),
    }
}
