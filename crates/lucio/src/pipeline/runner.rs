use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::adapters::{
    call_with_timeout, AdapterError, DocumentRenderer, PageFetcher, RenderRequest, ScreenImage,
    ScreenSource, TextGenerator,
};
use crate::config::Config;
use crate::error::LucioError;
use crate::llm::{GeminiClient, RetryConfig, RetryingGenerator};
use crate::render::PdfRenderer;
use crate::sanitize::{preview, redact_url};
use crate::secrets::resolve_api_key;
use crate::signals::{extract_keywords, extract_url_detailed};
use crate::web::WebScraper;

use super::budget::truncate_head;
use super::config::PipelineConfig;
use super::error::{Stage, StageError};
use super::progress::{ProgressEvent, ProgressReporter};
use super::prompts;
use super::record::{DocumentView, PipelineRecord, PipelineStatus, RunRequest, RunResponse, WebView};

/// The external capabilities one pipeline drives, one model per stage.
#[derive(Clone)]
pub struct Adapters {
    pub planner: Arc<dyn TextGenerator>,
    pub perceiver: Arc<dyn TextGenerator>,
    pub web_model: Arc<dyn TextGenerator>,
    pub content_model: Arc<dyn TextGenerator>,
    pub screen: Arc<dyn ScreenSource>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl Adapters {
    /// Uses the same model for all four stages.
    pub fn with_model(
        model: Arc<dyn TextGenerator>,
        screen: Arc<dyn ScreenSource>,
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            planner: Arc::clone(&model),
            perceiver: Arc::clone(&model),
            web_model: Arc::clone(&model),
            content_model: model,
            screen,
            fetcher,
            renderer,
        }
    }
}

/// Runs Plan → Perceive → Fetch → Render over one [`PipelineRecord`].
///
/// A pipeline holds no per-run state; one instance can serve many runs from
/// many threads at once.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    adapters: Adapters,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, adapters: Adapters) -> Self {
        Self { config, adapters }
    }

    /// Production constructor: Gemini models, HTTP scraper and PDF renderer
    /// built from `config`. Frames are read from `screen`.
    pub fn from_config(config: &Config, screen: Arc<dyn ScreenSource>) -> Result<Self, LucioError> {
        let api_key = resolve_api_key(&config.llm)?;
        let request_timeout = std::time::Duration::from_secs(config.llm.request_timeout_secs);
        let retry = RetryConfig::with_max_retries(config.llm.max_retries);

        let model = |name: &str| -> Result<Arc<dyn TextGenerator>, LucioError> {
            let client =
                GeminiClient::new(&config.llm.endpoint, name, &api_key, request_timeout)?;
            Ok(Arc::new(RetryingGenerator::new(client, retry.clone())))
        };

        let pipeline_config = PipelineConfig::from_config(config);
        let fetcher = WebScraper::new(&config.scraper, pipeline_config.budgets.extended_text_chars)?;

        let adapters = Adapters {
            planner: model(&config.models.planning)?,
            perceiver: model(&config.models.perception)?,
            web_model: model(&config.models.web)?,
            content_model: model(&config.models.content)?,
            screen,
            fetcher: Arc::new(fetcher),
            renderer: Arc::new(PdfRenderer::new()),
        };

        Ok(Self::new(Arc::new(pipeline_config), adapters))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingests `request`, runs it to a terminal status and summarizes it.
    pub fn run_request(&self, request: &RunRequest, progress: &dyn ProgressReporter) -> RunResponse {
        let record = PipelineRecord::from_request(request);
        self.run(record, progress).to_response()
    }

    /// Runs every stage in order, stopping at the first hard failure.
    /// Always returns the record; stage failures are recorded on it.
    pub fn run(&self, mut record: PipelineRecord, progress: &dyn ProgressReporter) -> PipelineRecord {
        let _pipeline_span = info_span!("pipeline",
            request_id = %record.request_id(),
            url_supplied = record.perception.url_supplied,
        )
        .entered();

        for stage in Stage::ALL {
            let _step = info_span!("stage", name = stage.span_name()).entered();
            progress.report(ProgressEvent::StageStarted { stage });

            let outcome = match stage {
                Stage::Plan => self.step_plan(&mut record),
                Stage::Perceive => self.step_perceive(&mut record),
                Stage::Fetch => self.step_fetch(&mut record),
                Stage::Render => self.step_render(&mut record),
            };

            match outcome {
                Ok(summary) => {
                    record.trace(stage, summary);
                    let message = record
                        .messages()
                        .last()
                        .map(|m| m.text.clone())
                        .unwrap_or_default();
                    progress.report(ProgressEvent::StageFinished { stage, message });
                }
                Err(e) => {
                    warn!("{} stage failed: {}", stage, e);
                    record.fail(stage, &e);
                    record.trace(stage, format!("Failed: {}", e));
                    progress.report(ProgressEvent::Failed {
                        stage,
                        error: format!("{}: {}", stage, e),
                    });
                    return record;
                }
            }
        }

        if record.complete() {
            let path = record
                .pdf_file_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            info!(errors = record.errors().len(), "Pipeline completed");
            progress.report(ProgressEvent::Completed {
                pdf_file_path: path,
            });
        } else {
            warn!(status = %record.status(), "Pipeline ended without a document");
        }

        record
    }

    fn generate(
        &self,
        model: &Arc<dyn TextGenerator>,
        prompt: String,
        image: Option<ScreenImage>,
    ) -> Result<String, AdapterError> {
        let model = Arc::clone(model);
        call_with_timeout(self.config.model_timeout, move || {
            model.generate(&prompt, image.as_ref())
        })
    }

    fn preview(&self, text: &str) -> String {
        preview(text, self.config.budgets.trace_preview_chars)
    }

    fn step_plan(&self, record: &mut PipelineRecord) -> Result<String, StageError> {
        let prompt = prompts::planning(record.input_prompt());
        let plan = self.generate(&self.adapters.planner, prompt, None)?;

        let summary = format!("Execution plan: {}", self.preview(&plan));
        record.execute_plan = Some(plan);
        record.advance(PipelineStatus::Running);
        Ok(summary)
    }

    fn step_perceive(&self, record: &mut PipelineRecord) -> Result<String, StageError> {
        record.perception.keyword = extract_keywords(record.input_prompt());

        if let Some(url) = record.perception.detected_url.as_deref() {
            let summary = format!("Using supplied URL {}", redact_url(url));
            record.advance(PipelineStatus::Running);
            return Ok(summary);
        }

        let image = self
            .adapters
            .screen
            .latest()
            .ok_or(StageError::CaptureFailure)?;
        debug!(bytes = image.len(), "Read latest screen frame");
        record.perception.screen_image = Some(image.clone());

        let query = record.input_prompt().to_string();
        let analysis = self.generate(
            &self.adapters.perceiver,
            prompts::perception(&query),
            Some(image.clone()),
        )?;
        record.perception.screen_analysis = Some(analysis.clone());

        let mut detected = extract_url_detailed(&analysis);
        if detected.is_none() {
            record.push_error(Stage::Perceive, &StageError::UrlNotInferred { retried: false });
            let answer = self.generate(
                &self.adapters.perceiver,
                prompts::perception_directive(&query),
                Some(image),
            )?;
            detected = extract_url_detailed(&answer);
        }

        match detected {
            Some((url, step)) => {
                debug!(step = %step, url = %redact_url(&url), "Inferred URL from screen");
                let summary = format!(
                    "Detected URL {} ({} match). Screen: {}",
                    redact_url(&url),
                    step,
                    self.preview(&analysis)
                );
                record.perception.detected_url = Some(url);
                record.advance(PipelineStatus::Running);
                Ok(summary)
            }
            None => {
                record.push_error(Stage::Perceive, &StageError::UrlNotInferred { retried: true });
                record.advance(PipelineStatus::Partial);
                Ok(format!("No URL inferred. Screen: {}", self.preview(&analysis)))
            }
        }
    }

    fn step_fetch(&self, record: &mut PipelineRecord) -> Result<String, StageError> {
        let url = record
            .perception
            .detected_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or(StageError::NoUrlAvailable)?;
        let keyword = record.perception.keyword.clone();

        let fetcher = Arc::clone(&self.adapters.fetcher);
        let target = url.clone();
        let page = call_with_timeout(self.config.fetch_timeout, move || {
            fetcher.fetch(&target, keyword.as_deref())
        })
        .map_err(|e| StageError::fetch(&url, Some(e.to_string())))?;

        if page.full_text.trim().is_empty() {
            return Err(StageError::fetch(&url, Some("page has no text".to_string())));
        }
        if page.title.trim().is_empty() {
            return Err(StageError::fetch(&url, Some("page has no title".to_string())));
        }

        let content = truncate_head(&page.extended_text, self.config.budgets.web_prompt_chars);
        let prompt = prompts::web(record.input_prompt(), &page.title, content);
        let output_text = self.generate(&self.adapters.web_model, prompt, None)?;

        let summary = format!(
            "Fetched \"{}\" from {}: {}",
            page.title,
            redact_url(&url),
            self.preview(&page.quick_summary)
        );

        record.web = Some(WebView {
            url,
            title: page.title,
            summary: page.quick_summary,
            output_text,
            output_text_from_url: page.full_text,
        });
        record.advance(PipelineStatus::Running);
        Ok(summary)
    }

    fn step_render(&self, record: &mut PipelineRecord) -> Result<String, StageError> {
        let (title, url, output_text) = match record.web.as_ref() {
            Some(web) if !web.output_text.trim().is_empty() => {
                (web.title.clone(), web.url.clone(), web.output_text.clone())
            }
            _ => return Err(StageError::NoContent),
        };

        let content = truncate_head(&output_text, self.config.budgets.content_prompt_chars);
        let prompt = prompts::content(record.input_prompt(), content);
        let formatted = self.generate(&self.adapters.content_model, prompt, None)?;
        if formatted.trim().is_empty() {
            return Err(StageError::NoContent);
        }

        let request = RenderRequest {
            title,
            content: formatted,
            url: Some(url),
            keyword: record.perception.keyword.clone(),
            output_dir: self.config.output_directory.clone(),
        };
        let renderer = Arc::clone(&self.adapters.renderer);
        let rendered = call_with_timeout(self.config.render_timeout, move || {
            renderer.render(&request)
        })
        .map_err(|e| StageError::RenderFailure(e.to_string()))?;

        let summary = format!("Document saved as {}", rendered.filename);
        record.document = Some(DocumentView {
            pdf_filename: rendered.filename,
            pdf_file_path: rendered.file_path,
            pdf_generated: true,
        });
        Ok(summary)
    }
}
