use crate::config::Config;
use reqwest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// One conversational turn on the wire: a role ("user" or "model") plus
/// its text parts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.to_string() }],
        }
    }

    pub fn model(text: &str) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.to_string() }],
        }
    }

    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[allow(dead_code)]
    display_name: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    config: Config,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: Config, api_key: String) -> Result<Self, Box<dyn std::error::Error>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        if config.preferences.verbose {
            println!("🔧 Using model: {}", config.gemini.model);
            println!(
                "🔧 API endpoint: {}/models/{}:generateContent",
                config.gemini.base_url, config.gemini.model
            );
        }

        Ok(Self { client, config, api_key })
    }

    pub fn model(&self) -> &str {
        &self.config.gemini.model
    }

    /// Send the full conversation to the model and return its reply turn.
    pub async fn generate_content(
        &self,
        contents: &[Content],
    ) -> Result<Content, Box<dyn std::error::Error>> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.config.gemini.base_url, self.config.gemini.model
        );

        if self.config.preferences.verbose {
            println!("🔗 Sending request to: {}", endpoint);
            println!("📊 Request: {} turns of history", contents.len());
        }

        let request = GenerateContentRequest { contents };
        let response_text = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        // The API reports failures as a JSON error body, try that first
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            return Err(format!(
                "Gemini API error: {} (code: {})",
                error_response.error.message, error_response.error.code
            )
            .into());
        }

        let response: GenerateContentResponse = serde_json::from_str(&response_text)?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or("Gemini returned no candidates")?;

        Ok(candidate.content)
    }

    pub async fn list_models(
        &self,
        search_term: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let endpoint = format!("{}/models", self.config.gemini.base_url);

        if self.config.preferences.verbose {
            println!("🔗 Fetching models from: {}", endpoint);
        }

        let response_text = self
            .client
            .get(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .text()
            .await?;

        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            return Err(format!(
                "Gemini API error: {} (code: {})",
                error_response.error.message, error_response.error.code
            )
            .into());
        }

        let models_response: ModelsResponse = serde_json::from_str(&response_text)?;

        let mut model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name.trim_start_matches("models/").to_string())
            .collect();

        if !search_term.is_empty() {
            let search_lower = search_term.to_lowercase();
            model_names.retain(|name| name.to_lowercase().contains(&search_lower));
        }

        model_names.sort();

        Ok(model_names)
    }
}

/// A single process-lifetime conversation. Owns the ordered exchange
/// history that seeds every request; mutated only between turns.
pub struct ChatSession {
    client: GeminiClient,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn open(client: GeminiClient) -> Self {
        Self { client, history: Vec::new() }
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Send one user message with the accumulated history. On success the
    /// exchange is appended to the history; on failure the user turn is
    /// rolled back so a failed exchange leaves no trace in later context.
    pub async fn send_message(&mut self, text: &str) -> Result<String, Box<dyn std::error::Error>> {
        self.history.push(Content::user(text));

        match self.client.generate_content(&self.history).await {
            Ok(reply) => {
                let reply_text = reply.text();
                self.history.push(reply);
                Ok(reply_text)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.history.len();
        self.history.clear();
        dropped
    }

    /// End the session, yielding the transcript for any final reporting.
    pub fn close(self) -> Vec<Content> {
        self.history
    }
}
