//! Prompt assembly for grounded question answering.

use docq_core::EmbeddedChunk;

/// The literal sentence the generator is instructed to reply with when the
/// retrieved context does not contain the answer.
pub const FALLBACK_ANSWER: &str = "I don't have enough information in the documents.";

/// Combine retrieved chunks and the question into the instruction template.
///
/// Chunk texts are joined by a blank line, in retrieval order. The template
/// tells the generator to answer only from that context and to reply with
/// [`FALLBACK_ANSWER`] otherwise. The generator is expected, not guaranteed,
/// to honor this; nothing downstream verifies groundedness.
///
/// Pure function; no I/O.
pub fn assemble(context_chunks: &[EmbeddedChunk], question: &str) -> String {
    let context = context_chunks
        .iter()
        .map(|entry| entry.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful assistant answering ONLY from the provided context.\n\
         If the answer is not found in the context, respond with:\n\
         \"{}\"\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question:\n\
         {}\n\
         \n\
         Answer clearly and concisely:",
        FALLBACK_ANSWER, context, question
    )
}
