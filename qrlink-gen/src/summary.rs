//! generateContent request and response model
//!
//! Builds the JSON body that asks the generative-text API for a short summary
//! of a URL, and pulls the summary text back out of the response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default generateContent endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Summary extraction errors
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Response contained no candidate text")]
    NoCandidates,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// generateContent response body (fields not used here are ignored)
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateRequest {
    /// Single-part request asking for a three-line summary of `url`
    pub fn summarize_url(url: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(instruction_for(url)),
                }],
                role: None,
            }],
        }
    }

    pub fn to_json(&self) -> String {
        // Serialising plain strings and vectors cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Natural-language instruction embedding the URL
pub fn instruction_for(url: &str) -> String {
    format!("summarize in 3 lines the given url {}", url)
}

/// First non-empty text part of the first candidate
pub fn extract_summary(body: &str) -> Result<String, SummaryError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| SummaryError::ParseError(e.to_string()))?;

    response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(SummaryError::NoCandidates)
}
