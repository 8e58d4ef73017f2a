//! Reading catalog files and choosing which ones to process.
//!
//! A catalog directory holds one JSON file per artist. The interactive flow
//! lists them and asks the operator for a number, the batch flow takes them all.

use crate::error::{AppError, Result};
use crate::foundation::catalog::Catalog;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads and parses a single catalog file.
///
/// # Arguments
///
/// * `path` - Path to a JSON document with `nome_artista` and an optional `albuns` list.
///
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| AppError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists every `.json` file directly inside `dir`, sorted by file name.
///
/// Returns [`AppError::NoCatalogs`] when the directory holds no catalog at all,
/// including when the directory itself is missing.
pub fn list_catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::NoCatalogs(dir.to_path_buf()));
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_catalog_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    if files.is_empty() {
        return Err(AppError::NoCatalogs(dir.to_path_buf()));
    }

    Ok(files)
}

fn is_catalog_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "json")
        .unwrap_or(false)
}

/// Prints the numbered list of catalogs and reads the operator's 1-based choice.
///
/// # Arguments
///
/// * `files` - Candidates as returned by [`list_catalog_files`].
/// * `input` - Where the answer is read from, usually locked stdin.
/// * `output` - Where the list and prompt are written, usually stdout.
///
pub fn select_catalog<R: BufRead, W: Write>(
    files: &[PathBuf],
    mut input: R,
    mut output: W,
) -> Result<PathBuf> {
    writeln!(output, "Catalogs available for download:")?;
    for (i, file) in files.iter().enumerate() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        writeln!(output, "{}. {}", i + 1, name)?;
    }
    write!(output, "\nEnter the number of the catalog to process: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();

    let choice: usize = answer
        .parse()
        .map_err(|_| AppError::SelectionError(format!("'{answer}' is not a number")))?;

    choice
        .checked_sub(1)
        .and_then(|index| files.get(index))
        .cloned()
        .ok_or_else(|| {
            AppError::SelectionError(format!(
                "{choice} is out of range (1-{})",
                files.len()
            ))
        })
}
