//! Question answering pipeline.

use std::sync::Arc;

use tracing::debug;

use docq_core::{Error, Result, TextEmbedder, TextGenerator};

use crate::conversation::ConversationStore;
use crate::index::VectorIndex;
use crate::prompt;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Orchestrates one question end to end: embed the question, retrieve the
/// closest chunks, assemble the prompt, invoke the generator, and record the
/// exchange in the session transcript.
///
/// Every question retrieves against the corpus independently; prior turns
/// never feed back into retrieval. A failed question appends the user
/// message only (the question was asked), surfaces the error to the caller,
/// and leaves the pipeline ready for the next question.
pub struct QueryPipeline<E: TextEmbedder, G: TextGenerator> {
    index: Arc<VectorIndex>,
    embedder: Arc<E>,
    generator: Arc<G>,
    top_k: usize,
}

impl<E: TextEmbedder, G: TextGenerator> QueryPipeline<E, G> {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<E>, generator: Arc<G>) -> Self {
        Self {
            index,
            embedder,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer `question` from the corpus and record the exchange in `session`.
    pub async fn ask(&self, session: &ConversationStore, question: &str) -> Result<String> {
        match self.answer(question).await {
            Ok(answer) => {
                session.append_exchange(question, Some(&answer))?;
                Ok(answer)
            }
            Err(err) => {
                session.append_exchange(question, None)?;
                Err(err)
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<String> {
        let query_vector = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| Error::Embedding(format!("failed to embed question: {}", e)))?;
        debug!(dimension = query_vector.len(), "question embedded");

        let hits = self.index.search(&query_vector, self.top_k)?;
        debug!(hits = hits.len(), "context retrieved");

        let prompt = prompt::assemble(&hits, question);
        debug!(prompt_chars = prompt.chars().count(), "prompt assembled");

        let result = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| Error::Generation(format!("generation failed: {}", e)))?;
        debug!(model_id = %result.model_id, "answer generated");

        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker;
    use crate::prompt::FALLBACK_ANSWER;
    use async_trait::async_trait;
    use docq_core::{Document, GenerationConfig, GenerationResult, Role};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEmbedder;

    #[async_trait]
    impl TextEmbedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> docq_core::Result<Vec<f32>> {
            Ok(vec![text.chars().count() as f32, 1.0])
        }

        fn model_id(&self) -> &str {
            "stub-embedder"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl TextEmbedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> docq_core::Result<Vec<f32>> {
            Err(Error::Network("connection reset by peer".to_string()))
        }

        fn model_id(&self) -> &str {
            "stub-embedder"
        }
    }

    /// Generator returning a fixed reply, or failing for the first
    /// `fail_first` calls.
    struct StubGenerator {
        reply: String,
        fail_first: usize,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail_first: 0,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                fail_first: usize::MAX,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_once(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail_first: 1,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> docq_core::Result<GenerationResult> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(Error::Network("connection reset by peer".to_string()));
            }
            Ok(GenerationResult {
                text: self.reply.clone(),
                model_id: "stub-generator".to_string(),
                tokens_used: None,
            })
        }

        async fn generate_with_config(
            &self,
            prompt: &str,
            _config: &GenerationConfig,
        ) -> docq_core::Result<GenerationResult> {
            self.generate(prompt).await
        }

        fn model_id(&self) -> &str {
            "stub-generator"
        }
    }

    async fn pipeline_with<E: TextEmbedder>(
        embedder: E,
        generator: Arc<StubGenerator>,
    ) -> (QueryPipeline<E, StubGenerator>, ConversationStore) {
        let document = Document {
            id: "manual_p1".to_string(),
            text: "n".repeat(1200),
            source_path: PathBuf::from("manual.txt"),
            page_number: 1,
        };
        let chunks = chunker::split(&[document], 1000, 200).unwrap();
        let index = VectorIndex::build(chunks, &FixedEmbedder).await.unwrap();

        (
            QueryPipeline::new(Arc::new(index), Arc::new(embedder), generator),
            ConversationStore::new(),
        )
    }

    #[tokio::test]
    async fn answered_question_appends_both_messages() {
        let generator = Arc::new(StubGenerator::replying("The manual covers that."));
        let (pipeline, session) = pipeline_with(FixedEmbedder, generator.clone()).await;

        let answer = pipeline.ask(&session, "What does the manual cover?").await.unwrap();
        assert_eq!(answer, "The manual covers that.");

        let messages = session.all().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "What does the manual cover?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "The manual covers that.");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_reply_passes_through_verbatim() {
        let generator = Arc::new(StubGenerator::replying(FALLBACK_ANSWER));
        let (pipeline, session) = pipeline_with(FixedEmbedder, generator).await;

        let answer = pipeline
            .ask(&session, "Who wrote the unrelated novel?")
            .await
            .unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);

        let messages = session.all().unwrap();
        assert_eq!(messages[1].content, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn generation_failure_keeps_only_the_user_message() {
        let generator = Arc::new(StubGenerator::failing());
        let (pipeline, session) = pipeline_with(FixedEmbedder, generator).await;

        let err = pipeline.ask(&session, "doomed question").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let messages = session.all().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "doomed question");
    }

    #[tokio::test]
    async fn pipeline_recovers_after_a_failed_generation() {
        let generator = Arc::new(StubGenerator::failing_once("Second time lucky."));
        let (pipeline, session) = pipeline_with(FixedEmbedder, generator).await;

        assert!(pipeline.ask(&session, "first try").await.is_err());
        assert_eq!(session.len().unwrap(), 1);

        let answer = pipeline.ask(&session, "second try").await.unwrap();
        assert_eq!(answer, "Second time lucky.");
        assert_eq!(session.len().unwrap(), 3);
    }

    #[tokio::test]
    async fn embedding_failure_keeps_only_the_user_message() {
        let generator = Arc::new(StubGenerator::replying("never reached"));
        let (pipeline, session) = pipeline_with(FailingEmbedder, generator.clone()).await;

        let err = pipeline.ask(&session, "doomed question").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));

        let messages = session.all().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
