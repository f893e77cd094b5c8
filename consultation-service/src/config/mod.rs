use serde::Deserialize;
use service_core::config as core_config;
use service_core::config::get_env;
use service_core::error::AppError;

/// Default model for consultation summaries.
const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsultationConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API credential. May be empty in dev; required in prod.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// How the consultation endpoint answers: incremental SSE or one JSON body.
    pub response_mode: ResponseMode,
    /// Allowed CORS origins; `*` means any origin.
    pub allowed_origins: Vec<String>,
    /// Optional directory of exported front-end assets to serve.
    pub static_dir: Option<String>,
}

/// Response mode for the consultation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Streaming,
    Buffered,
}

impl ConsultationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_prod();

        let static_dir = get_env("STATIC_DIR", Some(""), is_prod)?;

        Ok(ConsultationConfig {
            common: common_config,
            openai: OpenAiConfig {
                // An empty key is a handled condition at request time, so the
                // dev default is the empty string rather than a load error.
                api_key: get_env("OPENAI_API_KEY", Some(""), is_prod)?,
                model: get_env("OPENAI_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                temperature: get_env(
                    "OPENAI_TEMPERATURE",
                    Some(&DEFAULT_TEMPERATURE.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_TEMPERATURE),
            },
            server: ServerConfig {
                response_mode: match get_env("RESPONSE_MODE", Some("streaming"), is_prod)?.as_str()
                {
                    "buffered" => ResponseMode::Buffered,
                    _ => ResponseMode::Streaming,
                },
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                static_dir: if static_dir.is_empty() {
                    None
                } else {
                    Some(static_dir)
                },
            },
        })
    }

    /// Whether the provider credential is present.
    pub fn has_api_key(&self) -> bool {
        !self.openai.api_key.is_empty()
    }
}
