use std::sync::Arc;

use tracing::{error, info};

use assistant_common::generation::TextGenerator;

use crate::error::AppError;

pub const GENERATION_APOLOGY: &str = "I apologize, but I'm experiencing technical difficulties. \
Please try again later or contact the university directly for assistance.";

/// Builds prompts for the admissions assistant and turns generator output into reply text.
pub struct Responder {
    generator: Arc<dyn TextGenerator>,
    institution: String,
}

impl Responder {
    pub fn new(generator: Arc<dyn TextGenerator>, institution: impl Into<String>) -> Self {
        Self {
            generator,
            institution: institution.into(),
        }
    }

    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        let institution = &self.institution;
        format!(
            "You are a friendly and helpful university admissions assistant for the {institution}. \
Your task is to answer the user's question based only on the context provided. Do not add any \
information that is not in the context. If the information is not available in the context, say \
that you do not have that information.\n\n\
Please provide clear, helpful, and accurate information based on the context. Be conversational \
and welcoming, as this is a WhatsApp conversation.\n\n\
Context:\n{context}\n\n\
User Question: {question}\n\n\
Please provide a helpful response based on the context above."
        )
    }

    /// Ask the generator for an answer, reporting failures to the caller.
    pub async fn try_generate(&self, question: &str, context: &str) -> Result<String, AppError> {
        let prompt = self.build_prompt(question, context);
        let text = self.generator.generate_text(&prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Answer the question from the context. Never fails: generator errors are logged and
    /// replaced with [`GENERATION_APOLOGY`].
    pub async fn generate(&self, question: &str, context: &str) -> String {
        match self.try_generate(question, context).await {
            Ok(answer) => {
                info!(backend = %self.generator.backend(), chars = answer.len(), "generated answer");
                answer
            }
            Err(e) => {
                error!(backend = %self.generator.backend(), error = %e, "generation failed");
                GENERATION_APOLOGY.to_string()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubGenerator;
    use super::*;

    #[test]
    fn prompt_contains_instructions_context_and_question() {
        let responder = Responder::new(
            Arc::new(StubGenerator::answering("ok")),
            "University of Agriculture, Faisalabad",
        );
        let prompt = responder.build_prompt("When do admissions open?", "Program 1:\nProgram Name: DVM\n");

        assert!(prompt.starts_with(
            "You are a friendly and helpful university admissions assistant for the University of Agriculture, Faisalabad."
        ));
        assert!(prompt.contains("based only on the context provided"));
        assert!(prompt.contains("say that you do not have that information"));
        assert!(prompt.contains("\n\nContext:\nProgram 1:\nProgram Name: DVM\n\n\n"));
        assert!(prompt.contains("User Question: When do admissions open?\n\n"));
        assert!(prompt.ends_with("Please provide a helpful response based on the context above."));
    }

    #[tokio::test]
    async fn generate_returns_trimmed_answer() {
        let stub = Arc::new(StubGenerator::answering("  DVM is offered in the morning.\n"));
        let responder = Responder::new(stub.clone(), "Example University");

        let answer = responder.generate("dvm timing", "ctx").await;
        assert_eq!(answer, "DVM is offered in the morning.");

        let prompt = stub.last_prompt().unwrap();
        assert!(prompt.contains("Example University"));
        assert!(prompt.contains("User Question: dvm timing"));
    }

    #[tokio::test]
    async fn generation_failure_becomes_apology() {
        let responder = Responder::new(
            Arc::new(StubGenerator::failing("quota exceeded")),
            "Example University",
        );
        assert_eq!(responder.generate("hi", "ctx").await, GENERATION_APOLOGY);
    }

    #[tokio::test]
    async fn try_generate_surfaces_the_failure() {
        let responder = Responder::new(
            Arc::new(StubGenerator::failing("quota exceeded")),
            "Example University",
        );
        let err = responder.try_generate("hi", "ctx").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
