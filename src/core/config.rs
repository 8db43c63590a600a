use crate::analysis::ScoringPolicy;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ScoutConfig: file-based config loader (seo-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "SEO_SCOUT_CONFIG";
pub const ENV_PORT: &str = "SEO_SCOUT_PORT";
pub const ENV_OUTBOUND_LIMIT: &str = "OUTBOUND_LIMIT";

const CONFIG_FILE_NAME: &str = "seo-scout.json";

/// Largest page body `HttpFetcher` will read (5 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
/// Inquiries kept in memory before new submissions are refused.
pub const DEFAULT_MAX_INQUIRIES: usize = 1_000;

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// LLM sub-config (the `llm` key in seo-scout.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LlmConfig {
    /// Whether `/friendly` reports are generated at all. Defaults to `true`.
    pub enabled: Option<bool>,
    /// OpenAI-compatible endpoint, e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1`.
    pub base_url: Option<String>,
    /// API key. Never logged. Set to `""` for key-less local endpoints.
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Max characters of page text included in the prompt. Default: 12000.
    pub max_page_chars: Option<usize>,
    /// Max tokens the model may generate. Default: 1024.
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    /// JSON `enabled` → `SEO_SCOUT_LLM` env var ("0" disables) → `true`.
    pub fn resolve_enabled(&self) -> bool {
        if let Some(b) = self.enabled {
            return b;
        }
        std::env::var("SEO_SCOUT_LLM")
            .map(|v| v.trim() != "0")
            .unwrap_or(true)
    }

    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// An explicit empty string in the config file returns `Some("")`, meaning
    /// the endpoint needs no key.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.trim().to_string());
        }
        env_non_empty("OPENAI_API_KEY")
    }

    /// JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.trim().to_string();
            }
        }
        env_non_empty("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// JSON field → `SEO_SCOUT_LLM_MODEL` env var → `gpt-4o-mini`.
    pub fn resolve_model(&self) -> String {
        if let Some(m) = &self.model {
            if !m.trim().is_empty() {
                return m.trim().to_string();
            }
        }
        env_non_empty("SEO_SCOUT_LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    pub fn resolve_max_page_chars(&self) -> usize {
        self.max_page_chars
            .or_else(|| env_parse("SEO_SCOUT_LLM_MAX_PAGE_CHARS"))
            .unwrap_or(12_000)
    }

    pub fn resolve_max_tokens(&self) -> u32 {
        self.max_tokens
            .or_else(|| env_parse("SEO_SCOUT_LLM_MAX_TOKENS"))
            .unwrap_or(1024)
    }
}

/// Outbound page fetching (the `fetch` key).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub max_redirects: Option<usize>,
    pub user_agent: Option<String>,
    pub max_body_bytes: Option<usize>,
}

impl FetchConfig {
    /// JSON field → `HTTP_TIMEOUT_SECS` → 30.
    pub fn resolve_timeout_secs(&self) -> u64 {
        self.timeout_secs
            .or_else(|| env_parse("HTTP_TIMEOUT_SECS"))
            .unwrap_or(30)
    }

    /// JSON field → `HTTP_CONNECT_TIMEOUT_SECS` → 10.
    pub fn resolve_connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
            .or_else(|| env_parse("HTTP_CONNECT_TIMEOUT_SECS"))
            .unwrap_or(10)
    }

    pub fn resolve_max_redirects(&self) -> usize {
        self.max_redirects.unwrap_or(10)
    }

    /// JSON field → `SEO_SCOUT_MAX_BODY_BYTES` → 5 MiB. Zero is ignored.
    pub fn resolve_max_body_bytes(&self) -> usize {
        self.max_body_bytes
            .or_else(|| env_parse("SEO_SCOUT_MAX_BODY_BYTES"))
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// JSON field → `SEO_SCOUT_USER_AGENT` → `seo-scout/<version>`.
    pub fn resolve_user_agent(&self) -> String {
        if let Some(ua) = &self.user_agent {
            if !ua.trim().is_empty() {
                return ua.trim().to_string();
            }
        }
        env_non_empty("SEO_SCOUT_USER_AGENT")
            .unwrap_or_else(|| format!("seo-scout/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Top-level config loaded from `seo-scout.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    /// Bearer token required by `GET /inquiries`. Listing is refused when unset.
    #[serde(default)]
    pub admin_token: Option<String>,
    /// Cap on stored inquiries.
    #[serde(default)]
    pub max_inquiries: Option<usize>,
}

impl ScoutConfig {
    /// JSON `admin_token` → `SEO_SCOUT_ADMIN_TOKEN` env var → `None`.
    pub fn resolve_admin_token(&self) -> Option<String> {
        self.admin_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| env_non_empty("SEO_SCOUT_ADMIN_TOKEN").map(|t| t.trim().to_string()))
    }

    /// JSON `max_inquiries` → `SEO_SCOUT_MAX_INQUIRIES` → 1000. Zero is ignored.
    pub fn resolve_max_inquiries(&self) -> usize {
        self.max_inquiries
            .or_else(|| env_parse("SEO_SCOUT_MAX_INQUIRIES"))
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_INQUIRIES)
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![
        PathBuf::from(CONFIG_FILE_NAME),
        PathBuf::from("..").join(CONFIG_FILE_NAME),
    ];
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".seo-scout").join(CONFIG_FILE_NAME));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        v.insert(0, PathBuf::from(env_path));
    }
    v
}

/// Load `seo-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `SEO_SCOUT_CONFIG` env var path
/// 2. `./seo-scout.json`
/// 3. `../seo-scout.json`
/// 4. `~/.seo-scout/seo-scout.json`
///
/// Missing file → `ScoutConfig::default()` (all env-var fallbacks apply).
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    for path in &config_candidates() {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match parse_scout_config(&contents) {
            Ok(cfg) => {
                tracing::info!("{} loaded from {}", CONFIG_FILE_NAME, path.display());
                return cfg;
            }
            Err(e) => {
                tracing::warn!(
                    "{} parse error at {}: {}; using defaults",
                    CONFIG_FILE_NAME,
                    path.display(),
                    e
                );
                return ScoutConfig::default();
            }
        }
    }
    ScoutConfig::default()
}

pub fn parse_scout_config(contents: &str) -> Result<ScoutConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Max concurrent outbound page fetches: `OUTBOUND_LIMIT` → 16.
pub fn outbound_limit() -> usize {
    env_parse(ENV_OUTBOUND_LIMIT).filter(|n| *n > 0).unwrap_or(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_scout_config(
            r#"{
                "llm": {
                    "enabled": false,
                    "base_url": "http://localhost:11434/v1 ",
                    "api_key": "",
                    "model": "llama3",
                    "max_page_chars": 500,
                    "max_tokens": 256
                },
                "fetch": {
                    "timeout_secs": 5,
                    "max_redirects": 2,
                    "user_agent": "auditor/1.0",
                    "max_body_bytes": 65536
                },
                "scoring": { "missing_canonical_penalty": 2 },
                "admin_token": " s3cret ",
                "max_inquiries": 25
            }"#,
        )
        .unwrap();

        assert!(!cfg.llm.resolve_enabled());
        assert_eq!(cfg.llm.resolve_base_url(), "http://localhost:11434/v1");
        assert_eq!(cfg.llm.resolve_api_key(), Some(String::new()));
        assert_eq!(cfg.llm.resolve_model(), "llama3");
        assert_eq!(cfg.llm.resolve_max_page_chars(), 500);
        assert_eq!(cfg.llm.resolve_max_tokens(), 256);
        assert_eq!(cfg.fetch.resolve_timeout_secs(), 5);
        assert_eq!(cfg.fetch.resolve_max_redirects(), 2);
        assert_eq!(cfg.fetch.resolve_user_agent(), "auditor/1.0");
        assert_eq!(cfg.fetch.resolve_max_body_bytes(), 65536);
        assert_eq!(cfg.resolve_max_inquiries(), 25);
        assert_eq!(cfg.scoring.missing_canonical_penalty, 2);
        assert_eq!(cfg.scoring.missing_title_penalty, 2);
        assert_eq!(cfg.resolve_admin_token().as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg = parse_scout_config("{}").unwrap();
        assert_eq!(cfg.scoring, ScoringPolicy::default());
        assert_eq!(cfg.fetch.resolve_max_redirects(), 10);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(parse_scout_config("{ not json").is_err());
    }
}
