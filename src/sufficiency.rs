//! Context-sufficiency evaluation.
//!
//! Distance and semantic relevance diverge: a chunk can be distance-close
//! yet topically irrelevant. The evaluator therefore asks the language model
//! to judge whether the retrieved chunks can answer the question, computing
//! a distance heuristic alongside only to log disagreement. The model's
//! judgment is authoritative.
//!
//! Every evaluation produces an ordered trace of typed steps. Step *names*
//! are fixed per code path so tests can assert on structure while the
//! natural-language detail varies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::Candidate;
use crate::llm::LanguageModel;

/// The sufficiency verdict for a set of retrieved candidates.
///
/// `Insufficient` is a valid terminal state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The retrieved context answers the question confidently.
    Sufficient,
    /// An answer is possible but carries caveats.
    PartiallySufficient,
    /// The retrieved context cannot answer the question.
    Insufficient,
}

/// One entry in the evaluator's reasoning trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Fixed step name; see [`steps`].
    pub name: String,
    /// Free-form natural-language detail.
    pub detail: String,
}

impl TraceStep {
    /// Create a trace step.
    pub fn new(name: &str, detail: impl Into<String>) -> Self {
        Self { name: name.to_string(), detail: detail.into() }
    }
}

/// Fixed trace step names, in the order they appear.
pub mod steps {
    /// How many candidates retrieval produced.
    pub const CANDIDATES: &str = "candidates";
    /// Distance of the closest candidate.
    pub const TOP_DISTANCE: &str = "top_distance";
    /// What the distance heuristic alone would have concluded.
    pub const DISTANCE_HEURISTIC: &str = "distance_heuristic";
    /// The model's sufficiency judgment.
    pub const JUDGMENT: &str = "judgment";
    /// Emitted instead of [`JUDGMENT`] when the judgment call fails.
    pub const JUDGMENT_FAILED: &str = "judgment_failed";
    /// Emitted by the pipeline when retrieval itself failed.
    pub const RETRIEVAL_FAILED: &str = "retrieval_failed";
    /// Emitted by the synthesizer describing how the answer was produced.
    pub const SYNTHESIS: &str = "synthesis";
}

/// A verdict with its reasoning trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The sufficiency verdict.
    pub verdict: Verdict,
    /// Ordered reasoning steps taken to reach it.
    pub trace: Vec<TraceStep>,
}

impl Evaluation {
    /// A fail-safe insufficient evaluation carrying the given trace.
    pub fn insufficient(trace: Vec<TraceStep>) -> Self {
        Self { verdict: Verdict::Insufficient, trace }
    }
}

/// Distance below which the heuristic alone would call the context relevant.
/// Used only to log disagreement with the model; it never decides a verdict.
const HEURISTIC_DISTANCE_THRESHOLD: f32 = 0.5;

/// Judges whether retrieved context is adequate to answer a question.
pub struct SufficiencyEvaluator {
    model: Arc<dyn LanguageModel>,
}

impl SufficiencyEvaluator {
    /// Create an evaluator backed by the given language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Evaluate the candidates against the question.
    ///
    /// Never fails: if the judgment call itself errors, the evaluator fails
    /// safe to [`Verdict::Insufficient`] rather than let an answer be built
    /// on unverified context.
    pub async fn evaluate(&self, question: &str, candidates: &[Candidate]) -> Evaluation {
        let mut trace = vec![TraceStep::new(
            steps::CANDIDATES,
            format!("found {} candidate chunks", candidates.len()),
        )];

        let Some(top) = candidates.first() else {
            trace.push(TraceStep::new(
                steps::JUDGMENT,
                "no retrieved context; judged insufficient without consulting the model",
            ));
            return Evaluation::insufficient(trace);
        };

        trace.push(TraceStep::new(
            steps::TOP_DISTANCE,
            format!("top candidate distance = {:.4}", top.distance),
        ));

        let heuristic_relevant = top.distance < HEURISTIC_DISTANCE_THRESHOLD;
        trace.push(TraceStep::new(
            steps::DISTANCE_HEURISTIC,
            format!(
                "distance heuristic (threshold {HEURISTIC_DISTANCE_THRESHOLD}) suggests context is {}",
                if heuristic_relevant { "relevant" } else { "weak" }
            ),
        ));

        let prompt = judgment_prompt(question, candidates);
        match self.model.generate(&prompt).await {
            Ok(reply) => {
                let verdict = parse_verdict(&reply);
                let model_relevant = verdict != Verdict::Insufficient;
                if model_relevant != heuristic_relevant {
                    // The model wins; the disagreement is only recorded.
                    warn!(
                        top_distance = top.distance,
                        ?verdict,
                        "distance heuristic disagrees with model judgment; using the model"
                    );
                }
                trace.push(TraceStep::new(
                    steps::JUDGMENT,
                    format!(
                        "model judged context {verdict:?}{}",
                        if model_relevant != heuristic_relevant {
                            " (overrides the distance heuristic)"
                        } else {
                            ""
                        }
                    ),
                ));
                Evaluation { verdict, trace }
            }
            Err(e) => {
                warn!(error = %e, "sufficiency judgment failed; failing safe to insufficient");
                trace.push(TraceStep::new(
                    steps::JUDGMENT_FAILED,
                    format!("judgment call failed ({e}); failing safe to insufficient"),
                ));
                Evaluation::insufficient(trace)
            }
        }
    }
}

/// Build the classification prompt: the question plus the top-k chunk texts.
fn judgment_prompt(question: &str, candidates: &[Candidate]) -> String {
    let mut prompt = String::from(
        "You are judging whether retrieved context is enough to answer a question.\n\nQuestion: ",
    );
    prompt.push_str(question);
    prompt.push_str("\n\nRetrieved context:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", i + 1, candidate.record.text));
    }
    prompt.push_str(
        "\nCan the context above answer the question? \
         Reply with exactly one word: SUFFICIENT, PARTIAL, or INSUFFICIENT.",
    );
    prompt
}

/// Parse the model's one-word classification, leniently.
///
/// Unparseable replies fall back to `Insufficient`, the safe direction.
fn parse_verdict(reply: &str) -> Verdict {
    let reply = reply.to_ascii_lowercase();
    if reply.contains("partial") {
        Verdict::PartiallySufficient
    } else if reply.contains("insufficient") {
        Verdict::Insufficient
    } else if reply.contains("sufficient") {
        Verdict::Sufficient
    } else {
        Verdict::Insufficient
    }
}
