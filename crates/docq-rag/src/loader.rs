//! Corpus loading from a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, TagEnd};
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use docq_core::{CorpusLoader, Document, Error, Result};

use crate::cache::CorpusFingerprint;

/// Loads a corpus from `root`, taking every file whose path relative to
/// `root` matches `pattern` (a glob; `*`, `**` and `?` are understood).
///
/// Markdown files are reduced to plain text before chunking. Form feeds mark
/// page boundaries, the way PDF text extractors emit them; a file without
/// one is a single page 1.
pub struct DirectoryLoader {
    root: PathBuf,
    pattern: String,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
        }
    }

    /// List every matching corpus file, sorted for determinism.
    ///
    /// A missing corpus folder and a folder with no matching files come back
    /// as distinct [`Error::CorpusNotFound`] messages, so the operator sees
    /// "no documents found" rather than an internal error.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::CorpusNotFound(format!(
                "corpus folder '{}' does not exist",
                self.root.display()
            )));
        }

        let matcher = glob_to_regex(&self.pattern)?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| Error::Other(format!("corpus scan failed: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if matcher.is_match(&relative.to_string_lossy()) {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();

        if files.is_empty() {
            return Err(Error::CorpusNotFound(format!(
                "no documents matching '{}' in '{}'",
                self.pattern,
                self.root.display()
            )));
        }

        debug!(files = files.len(), "corpus scanned");
        Ok(files)
    }

    /// Fingerprint the current corpus snapshot.
    pub fn fingerprint(&self) -> Result<CorpusFingerprint> {
        let files = self.scan()?;
        CorpusFingerprint::of_files(&files)
    }
}

#[async_trait]
impl CorpusLoader for DirectoryLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let files = self.scan()?;
        let mut documents = Vec::new();

        for path in &files {
            let raw = tokio::fs::read_to_string(path).await?;
            let text = if path.extension().is_some_and(|ext| ext == "md") {
                markdown_to_text(&raw)
            } else {
                raw
            };

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let stem = relative
                .with_extension("")
                .to_string_lossy()
                .replace(['/', '\\'], "_");

            for (page_index, page) in text.split('\u{0c}').enumerate() {
                let page_number = page_index + 1;
                documents.push(Document {
                    id: format!("{}_p{}", stem, page_number),
                    text: page.to_string(),
                    source_path: path.clone(),
                    page_number,
                });
            }
        }

        info!(
            documents = documents.len(),
            files = files.len(),
            "corpus loaded"
        );
        Ok(documents)
    }
}

/// Translate a glob pattern into an anchored regex over relative paths.
///
/// `**` crosses directory separators, `*` and `?` do not. A leading `**/`
/// also matches files at the corpus root.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex.push_str("(?:.*/)?");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');

    Regex::new(&regex)
        .map_err(|e| Error::InvalidInput(format!("invalid corpus glob '{}': {}", pattern, e)))
}

/// Reduce markdown to the plain text the chunker and embedder see.
fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) => text.push_str(&t),
            Event::Code(code) => text.push_str(&code),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock) => {
                text.push('\n');
            }
            _ => {}
        }
    }

    text.trim_end().to_string()
}
