//! Prompt construction and answer synthesis.
//!
//! Builds a single constrained prompt from the retrieved context and
//! the question, invokes the generation capability once, and returns
//! its text verbatim alongside the citation metadata. Page numbers are
//! kept out of the generated prose: they are surfaced structurally as
//! citations instead.

use crate::error::GenerateError;
use crate::generate::Generator;
use crate::retrieve::{Citation, Retrieved};
use serde::{Deserialize, Serialize};

/// Maximum bullet points the model is asked to produce.
const MAX_ANSWER_POINTS: usize = 5;

/// The result of one question: generated text plus the citations and
/// the ordered distinct pages that produced the context. Created fresh
/// per question, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub relevant_pages: Vec<usize>,
}

/// Build the single prompt sent to the model.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question using ONLY the policy text below.\n\
         If the policy does not explicitly address the question, say so clearly.\n\
         Do not cite page numbers in your answer; sources are reported separately.\n\
         Prefer a short answer of at most {MAX_ANSWER_POINTS} bullet points.\n\
         \n\
         POLICY TEXT:\n\
         {context}\n\
         \n\
         QUESTION:\n\
         {question}\n"
    )
}

/// Invoke the generator once for a retrieved context and package the
/// result. Generation failure is not masked.
pub async fn answer(
    generator: &dyn Generator,
    question: &str,
    retrieved: Retrieved,
) -> Result<AnswerResult, GenerateError> {
    let prompt = build_prompt(question, &retrieved.context);
    let text = generator.generate(&prompt).await?;

    Ok(AnswerResult {
        answer: text,
        citations: retrieved.citations,
        relevant_pages: retrieved.relevant_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            Ok(format!("echo:{}", prompt.len()))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::AuthFailed {
                provider: "stub".into(),
            })
        }
    }

    #[test]
    fn prompt_contains_context_question_and_constraints() {
        let prompt = build_prompt("How many days?", "[Page 1]\nTwenty days of leave.");
        assert!(prompt.contains("ONLY the policy text"));
        assert!(prompt.contains("does not explicitly address"));
        assert!(prompt.contains("Do not cite page numbers"));
        assert!(prompt.contains("[Page 1]\nTwenty days of leave."));
        assert!(prompt.contains("How many days?"));
    }

    #[tokio::test]
    async fn answer_carries_citations_through() {
        let retrieved = Retrieved {
            context: "[Page 2]\nSome text".into(),
            citations: vec![Citation {
                page: 2,
                preview: "Some text".into(),
            }],
            relevant_pages: vec![2],
        };

        let result = answer(&EchoGenerator, "question", retrieved).await.unwrap();
        assert!(result.answer.starts_with("echo:"));
        assert_eq!(result.relevant_pages, vec![2]);
        assert_eq!(result.citations[0].page, 2);
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let retrieved = Retrieved {
            context: String::new(),
            citations: Vec::new(),
            relevant_pages: Vec::new(),
        };
        let err = answer(&FailingGenerator, "question", retrieved)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::AuthFailed { .. }));
    }
}
