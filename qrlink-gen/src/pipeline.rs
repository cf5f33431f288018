//! Pipeline Orchestrator
//!
//! Runs one QR-link generation pass: greet, prompt, encode, summarize,
//! persist, release.
//!
//! # Error Handling
//! - Per-stage isolation: every collaborator returns a `StageResult`; a failed
//!   stage is reported on the console, recorded in the [`RunReport`], and the
//!   next stage runs with a placeholder or absent value.
//! - Degraded continuation: an absent summary is still persisted, using the
//!   absent marker.
//! - The input source and HTTP client are held in [`Scoped`] guards, so they
//!   are released on every exit path. Release failures are logged only.
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(settings);
//! let report = pipeline.run(PromptInput::stdin()).await;
//! ```

use crate::config::PipelineSettings;
use crate::http::HttpClient;
use crate::input::PromptInput;
use crate::models::{
    ApiResult, EncodedArtifact, QrRecord, RunInput, RunReport, ABSENT_DESCRIPTION,
    DEFAULT_MOBILE_NUMBER, DEFAULT_URL,
};
use crate::qr::QrEncoder;
use crate::store::RecordStore;
use crate::summary::{extract_summary, GenerateRequest, API_KEY_HEADER};
use qrlink_common::{Scoped, Stage, StageError, StageResult};
use std::io::{BufRead, Write};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

const NAME_PROMPT: &str = "Please enter your name: ";
const URL_PROMPT: &str = "Please enter the URL to encode in QR Code: ";
const MOBILE_PROMPT: &str = "Please enter the recipient mobile number: ";
const GENERIC_GREETING: &str = "Welcome to QR Code Generator!";

/// Sequential orchestrator over the prompt, QR, HTTP and database stages
pub struct Pipeline {
    settings: PipelineSettings,
    encoder: QrEncoder,
    store: RecordStore,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        let store = RecordStore::new(settings.config_path.clone());
        Self {
            settings,
            encoder: QrEncoder::default(),
            store,
        }
    }

    /// Run every stage once, in order, using an already-acquired input source
    ///
    /// Never fails: the returned report lists every stage that degraded.
    pub async fn run<R: BufRead, W: Write>(&self, input: PromptInput<R, W>) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_stages(run_id, input).instrument(span).await
    }

    async fn run_stages<R: BufRead, W: Write>(
        &self,
        run_id: Uuid,
        input: PromptInput<R, W>,
    ) -> RunReport {
        let started = chrono::Utc::now();
        info!("Pipeline run started");

        let mut failures: Vec<(Stage, StageError)> = Vec::new();
        let mut input = Scoped::new(input);

        // Stage 1: greeting
        match input.next_line(NAME_PROMPT) {
            Ok(name) if !name.is_empty() => input.say(&format!("Welcome, {}!", name)),
            Ok(_) => input.say(GENERIC_GREETING),
            Err(e) => {
                warn!(error = %e, "Error during welcome process");
                input.say(GENERIC_GREETING);
                failures.push((Stage::Welcome, e));
            }
        }

        // Stage 2: url and mobile number
        let run_input = match prompt_run_input(&mut input) {
            Ok(run_input) => run_input,
            Err(e) => {
                error!(error = %e, "Error reading user input");
                eprintln!("Failed to read input. Using default values.");
                failures.push((Stage::Prompt, e));
                RunInput::default()
            }
        };

        // Stage 3: QR image
        input.say(&format!("Generating QR Code for URL: {}", run_input.url));
        let artifact = match self.encoder.encode(
            &run_input.url,
            self.settings.qr_width,
            self.settings.qr_height,
            &self.settings.output_path,
        ) {
            Ok(artifact) => {
                input.say(&format!(
                    "QR Code generated successfully! Check {}",
                    artifact.output_path.display()
                ));
                artifact
            }
            Err(e) => {
                eprintln!("Failed to generate QR Code: {}", e);
                failures.push((Stage::Encode, e));
                EncodedArtifact::failed(
                    &run_input.url,
                    self.settings.qr_width,
                    self.settings.qr_height,
                    &self.settings.output_path,
                )
            }
        };

        // Stage 4: summary request
        let mut client = match HttpClient::with_timeout(self.settings.http_timeout) {
            Ok(client) => Some(Scoped::new(client)),
            Err(e) => {
                error!(error = %e, "Could not create HTTP client");
                failures.push((Stage::Summarize, e));
                None
            }
        };

        let api = match client.as_deref() {
            Some(http) => match self.summarize(http, &run_input.url, &mut input).await {
                Ok(api) => api,
                Err(e) => {
                    eprintln!("API request failed: {}", e);
                    failures.push((Stage::Summarize, e));
                    ApiResult::absent()
                }
            },
            None => ApiResult::absent(),
        };

        // Stage 5: persistence
        let record = QrRecord::from_run(&run_input, &api);
        if record.short_description.is_none() {
            warn!(
                marker = ABSENT_DESCRIPTION,
                "No summary available, persisting absent marker"
            );
        }
        let persisted = match self.store.insert_record(&record).await {
            Ok(_) => {
                input.say("Data stored successfully in database.");
                true
            }
            Err(e) => {
                eprintln!("Failed to store data in database: {}", e);
                failures.push((Stage::Persist, e));
                false
            }
        };

        // Stage 6: release, HTTP client first
        if let Some(http) = client.as_mut() {
            if let Err(e) = http.release_now() {
                failures.push((Stage::Release, e));
            }
        }
        if let Err(e) = input.release_now() {
            failures.push((Stage::Release, e));
        }

        let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
        info!(
            elapsed_ms,
            degraded_stages = failures.len(),
            "Application shutdown complete"
        );
        input.say("\nApplication completed.");

        RunReport {
            run_id,
            input: run_input,
            artifact,
            api,
            record,
            persisted,
            failures,
        }
    }

    /// POST the summary request and pull the summary text out of the response
    async fn summarize<R: BufRead, W: Write>(
        &self,
        http: &HttpClient,
        url: &str,
        input: &mut PromptInput<R, W>,
    ) -> StageResult<ApiResult> {
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            StageError::ConfigIncomplete("summary API key is not configured".to_string())
        })?;

        let body = GenerateRequest::summarize_url(url).to_json();
        input.say(&body);

        let headers = [
            (API_KEY_HEADER, api_key),
            ("Content-Type", "application/json"),
        ];
        let response = http
            .post(&self.settings.api_endpoint, &body, &headers)
            .await?;

        input.say("API Response:");
        input.say(&response);
        info!("API call completed successfully");

        let summary = match extract_summary(&response) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Could not extract summary text, storing raw response");
                response.clone()
            }
        };

        Ok(ApiResult {
            body: Some(response),
            summary: Some(summary),
        })
    }
}

/// Read url and mobile number; blank answers fall back to the placeholders
fn prompt_run_input<R: BufRead, W: Write>(input: &mut PromptInput<R, W>) -> StageResult<RunInput> {
    let url = input.next_line(URL_PROMPT)?;
    let url = if url.is_empty() {
        input.say(&format!("Input was empty, defaulting to: {}", DEFAULT_URL));
        DEFAULT_URL.to_string()
    } else {
        url
    };

    let mobile_number = input.next_line(MOBILE_PROMPT)?;
    let mobile_number = if mobile_number.is_empty() {
        input.say(&format!(
            "Input was empty, defaulting to: {}",
            DEFAULT_MOBILE_NUMBER
        ));
        DEFAULT_MOBILE_NUMBER.to_string()
    } else {
        mobile_number
    };

    Ok(RunInput { url, mobile_number })
}
