//! LLM Client — the single point of entry for the /ai/chat endpoint.
//!
//! The LLM is an external collaborator: it receives a natural-language
//! question together with a description of the database schema and returns
//! a free-text answer. Nothing here interprets or executes SQL.

use axum::{extract::State, Json};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const MAX_OUTPUT_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.2;
const MAX_RETRIES: u32 = 3;

/// Schema description handed to the model with every question. Kept in
/// sync with migrations/ by hand.
const DB_SCHEMA_DESCRIPTION: &str = "\
users: employee personal and role information (id, sso_id, first_name, last_name, email, role, current_project_role_id).
skills: all available skills (id, name, description).
proficiency_levels: levels of skill mastery (id, name, level, description).
user_skills: maps employees to their skills and proficiency levels (user_id, skill_id, proficiency_level_id).
project_roles: defined project roles (id, name, description).
courses: learning courses (id, name, description, skill_id, recommended_proficiency_level_id).
learning_paths: curated sequences of courses.
user_course_progress: individual user progress in courses (user_id, course_id, status, progress_percentage).";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Thin wrapper over the Gemini generateContent API with retry on 429/5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends one question with the schema description as the system
    /// instruction and returns the model's free-text answer.
    pub async fn ask(&self, question: &str) -> Result<String, LlmError> {
        let system = format!(
            "You are an assistant for a Learning Management System. Answer questions \
             about the data described by this database schema:\n{DB_SCHEMA_DESCRIPTION}"
        );
        let request_body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart { text: &system }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: question }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(GEMINI_API_URL)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: GeminiResponse = response.json().await?;
            let answer = extract_answer(parsed).ok_or(LlmError::EmptyContent)?;
            debug!("LLM call succeeded ({} chars)", answer.len());
            return Ok(answer);
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent))
    }
}

fn extract_answer(response: GeminiResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content
        .parts?
        .into_iter()
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /ai/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("Query cannot be empty.".to_string()));
    }

    debug!("Chat question from {}: {}", user.sso_id, req.question);
    let answer = state
        .llm
        .ask(&req.question)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(Json(ChatResponse { answer }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(parts: Option<Vec<CandidatePart>>) -> GeminiResponse {
        GeminiResponse {
            candidates: Some(vec![Candidate {
                content: CandidateContent { parts },
            }]),
        }
    }

    #[test]
    fn test_extract_answer_first_text_part() {
        let parsed = response(Some(vec![
            CandidatePart { text: None },
            CandidatePart {
                text: Some("42 employees know SQL.".to_string()),
            },
        ]));
        assert_eq!(
            extract_answer(parsed).as_deref(),
            Some("42 employees know SQL.")
        );
    }

    #[test]
    fn test_extract_answer_empty_candidates() {
        assert!(extract_answer(GeminiResponse { candidates: None }).is_none());
        assert!(extract_answer(response(None)).is_none());
    }

    #[test]
    fn test_extract_answer_rejects_blank_text() {
        let parsed = response(Some(vec![CandidatePart {
            text: Some("   ".to_string()),
        }]));
        assert!(extract_answer(parsed).is_none());
    }
}
