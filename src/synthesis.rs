//! Answer synthesis from retrieved context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::document::{Candidate, SourceRef};
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;
use crate::sufficiency::{Evaluation, TraceStep, Verdict, steps};

/// The fixed answer returned when the retrieved context is insufficient.
pub const NO_CONTEXT_ANSWER: &str =
    "I don't have enough information in the ingested documents to answer this question.";

/// The result of one query: answer, verdict, reasoning trail, and sources.
///
/// Transient; returned once per query. The caller always receives a
/// well-formed result, including when the verdict is
/// [`Verdict::Insufficient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The synthesized answer text.
    pub answer: String,
    /// The context-sufficiency verdict.
    pub verdict: Verdict,
    /// Ordered reasoning-trail entries.
    pub thoughts: Vec<TraceStep>,
    /// The chunks considered as evidence, most relevant first.
    pub sources: Vec<SourceRef>,
}

/// Composes a prompt from question and context and invokes the language
/// model to produce the answer.
pub struct AnswerSynthesizer {
    model: Arc<dyn LanguageModel>,
}

impl AnswerSynthesizer {
    /// Create a synthesizer backed by the given language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Produce an [`AnswerResult`] for the question.
    ///
    /// An `Insufficient` verdict still yields `Ok` with an explicit
    /// "not enough information" answer and the evaluator's trail. For
    /// `Sufficient`/`PartiallySufficient` verdicts the model is invoked once
    /// with the chunks ordered most-relevant-first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`] if the language-model provider
    /// fails. Generation is not retried; the caller may retry the whole
    /// query.
    pub async fn answer(
        &self,
        question: &str,
        candidates: &[Candidate],
        evaluation: Evaluation,
    ) -> Result<AnswerResult> {
        let Evaluation { verdict, mut trace } = evaluation;
        let sources: Vec<SourceRef> = candidates.iter().map(SourceRef::from).collect();

        if verdict == Verdict::Insufficient {
            trace.push(TraceStep::new(
                steps::SYNTHESIS,
                "context insufficient; returned the fixed no-context answer",
            ));
            info!(?verdict, "query answered without generation");
            return Ok(AnswerResult {
                answer: NO_CONTEXT_ANSWER.to_string(),
                verdict,
                thoughts: trace,
                sources,
            });
        }

        let prompt = answer_prompt(question, candidates, verdict);
        let answer = self.model.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            match e {
                RagError::GenerationFailed(_) => e,
                other => RagError::GenerationFailed(other.to_string()),
            }
        })?;

        trace.push(TraceStep::new(
            steps::SYNTHESIS,
            format!("model synthesized an answer from {} chunks", candidates.len()),
        ));
        info!(?verdict, source_count = sources.len(), "query answered");

        Ok(AnswerResult { answer, verdict, thoughts: trace, sources })
    }
}

/// Compose the generation prompt: chunks in ascending-distance order (most
/// relevant first), with a caveat instruction for partial context.
fn answer_prompt(question: &str, candidates: &[Candidate], verdict: Verdict) -> String {
    let mut prompt =
        String::from("Answer the question using only the context below.\n\nContext:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", i + 1, candidate.record.text));
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(question);
    if verdict == Verdict::PartiallySufficient {
        prompt.push_str(
            "\n\nThe context only partially covers the question. \
             State the caveats and what is missing alongside your answer.",
        );
    }
    prompt.push_str("\n\nAnswer:");
    prompt
}
