use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const COMPLETIONS_API_URL: &str = "https://api.perplexity.ai/chat/completions";
const COMPLETION_MODEL: &str = "sonar";

const SYSTEM_PROMPT: &str = r#"You are a witty and insightful analyst. Your persona is that of a smart friend who finds the 'real story' behind a news headline. Your task is to write a short, 2-paragraph blog post that is both engaging for humans and optimized for search engines (SEO).

### CRITICAL INSTRUCTIONS:
1.  **STRUCTURE (2 Paragraphs):**
    *   **Paragraph 1 (The "Hot Take"):** Start with your clever, insightful, or ironic perspective. Find the "real story" or the absurdity in the situation. This is where your unique, witty voice must shine and hook the reader.
    *   **Paragraph 2 (The "What & Why"):** After the hook, provide the necessary context. Clearly explain the news: what is happening and why is it important? Naturally include relevant SEO keywords.
2.  **TONE:** The first paragraph must be witty and conversational. The second paragraph should be more informative and authoritative.
3.  **FORMAT:** Your entire response must be ONLY the two paragraphs of the blog post. No title, no other explanations."#;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct CommentaryClient {
    client: Client,
    api_key: String,
}

impl CommentaryClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }

    /// Two-paragraph commentary for a headline, paragraphs separated by a
    /// line break as the store expects.
    pub async fn write_commentary(&self, headline: &str) -> Result<String> {
        let request = ChatRequest {
            model: COMPLETION_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Write the 2-paragraph blog post for this headline: {}",
                        headline
                    ),
                },
            ],
        };

        let response = self
            .client
            .post(COMPLETIONS_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::CompletionApi(format!(
                "API error: {}",
                error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        let commentary = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::CompletionApi("no choices returned".to_string()))?;

        Ok(commentary.trim().to_string())
    }
}
