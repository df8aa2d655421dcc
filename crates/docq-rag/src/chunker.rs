//! Sliding-window document chunking.

use docq_core::{Chunk, Document, Error, Result};

/// Split documents into overlapping fixed-size chunks.
///
/// A window of `size` characters slides across each document's text,
/// advancing `size - overlap` characters per step, so consecutive chunks
/// from one document share their `overlap` boundary characters. The final
/// chunk of a document may be shorter than `size`. Windows are measured in
/// characters and may split mid-word; that is an accepted approximation.
///
/// Chunks come out in document order, then offset order within a document.
/// That ordering becomes the vector index's insertion order.
///
/// Pure function: requires `size > 0` and `overlap < size`, touches nothing
/// outside its inputs.
pub fn split(documents: &[Document], size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if size == 0 {
        return Err(Error::InvalidInput(
            "chunk size must be greater than zero".to_string(),
        ));
    }
    if overlap >= size {
        return Err(Error::InvalidInput(format!(
            "chunk overlap ({}) must be smaller than chunk size ({})",
            overlap, size
        )));
    }

    let mut chunks = Vec::new();
    for document in documents {
        split_document(document, size, overlap, &mut chunks);
    }
    Ok(chunks)
}

fn split_document(document: &Document, size: usize, overlap: usize, chunks: &mut Vec<Chunk>) {
    let chars: Vec<char> = document.text.chars().collect();
    let mut start = 0;
    let mut index = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let text: String = chars[start..end].iter().collect();
        chunks.push(Chunk {
            id: format!("{}_{}", document.id, index),
            document_id: document.id.clone(),
            text,
            start_offset: start,
            end_offset: end,
        });
        index += 1;

        if end >= chars.len() {
            break;
        }
        start = end - overlap;
    }
}
