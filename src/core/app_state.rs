use crate::core::config::{self, ScoutConfig};
use crate::features::inquiries::InquiryStore;
use crate::report::{DisabledReportGenerator, OpenAiReportGenerator, ReportGenerator};
use crate::scraping::fetch::{HttpFetcher, PageFetcher};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub report_generator: Arc<dyn ReportGenerator>,
    pub inquiries: Arc<InquiryStore>,
    // Concurrency control for outbound page fetches
    pub outbound_limit: Arc<tokio::sync::Semaphore>,
    /// File-based config loaded from `seo-scout.json` (env-var fallback for all fields).
    pub config: Arc<ScoutConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("llm_enabled", &self.config.llm.resolve_enabled())
            .field("outbound_permits", &self.outbound_limit.available_permits())
            .finish()
    }
}

impl AppState {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        report_generator: Arc<dyn ReportGenerator>,
        config: ScoutConfig,
    ) -> Self {
        Self {
            fetcher,
            report_generator,
            inquiries: Arc::new(InquiryStore::with_capacity(config.resolve_max_inquiries())),
            outbound_limit: Arc::new(tokio::sync::Semaphore::new(config::outbound_limit())),
            config: Arc::new(config),
        }
    }

    /// Wire the production fetcher and report generator from config.
    pub fn from_config(config: ScoutConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.fetch)?;

        let report_generator: Arc<dyn ReportGenerator> = if !config.llm.resolve_enabled() {
            info!("LLM reports disabled by config. /friendly will answer 503.");
            Arc::new(DisabledReportGenerator::switched_off())
        } else {
            let llm_client = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?;
            match OpenAiReportGenerator::from_config(llm_client, &config.llm) {
                Some(generator) => {
                    info!(
                        "LLM reports enabled: model {} at {}",
                        config.llm.resolve_model(),
                        config.llm.resolve_base_url()
                    );
                    Arc::new(generator)
                }
                None => {
                    warn!("OPENAI_API_KEY not set and no llm.api_key configured. /friendly will answer 503.");
                    Arc::new(DisabledReportGenerator::missing_key())
                }
            }
        };

        Ok(Self::new(Arc::new(fetcher), report_generator, config))
    }
}
