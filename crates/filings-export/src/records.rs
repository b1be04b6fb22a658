//! JSON Lines persistence of annotated documents.

use filings_core::{AnnotatedDocument, FilingsError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes one document as a single JSON line, replacing the file.
pub fn save_annotated_document(doc: &AnnotatedDocument, path: &Path) -> Result<()> {
    save_annotated_documents(std::slice::from_ref(doc), path)
}

/// Writes each document as one JSON line, replacing the file.
pub fn save_annotated_documents(docs: &[AnnotatedDocument], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for doc in docs {
        serde_json::to_writer(&mut writer, doc)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads every document from a JSON Lines file. Blank lines are skipped.
///
/// # Errors
/// Returns [`FilingsError::Parse`] naming the line that is not a document.
pub fn load_annotated_documents(path: &Path) -> Result<Vec<AnnotatedDocument>> {
    let reader = BufReader::new(File::open(path)?);
    let mut docs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line).map_err(|e| {
            FilingsError::Parse(format!("{} line {}: {e}", path.display(), index + 1))
        })?;
        docs.push(doc);
    }
    Ok(docs)
}
