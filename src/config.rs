use anyhow::Result;
use serde::Deserialize;

/// Environment variable prefix for overrides, e.g.
/// `VOICE_MINUTES_LINE__CHANNEL_SECRET=...`
const ENV_PREFIX: &str = "VOICE_MINUTES";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub line: LineConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Messaging platform credentials and limits
#[derive(Debug, Deserialize)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    /// Separate host for binary message content
    #[serde(default = "default_line_blob_base")]
    pub blob_base: String,
    /// Platform allows 5000 chars per message; leave headroom for part headers
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Reserved for future password obfuscation, currently unused
    #[serde(default = "default_password_seed")]
    pub password_seed: String,
    pub session_ttl_secs: u64,
    /// Deployment timezone as a fixed UTC offset (passwords rotate at local midnight)
    pub utc_offset_hours: i32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_seed: default_password_seed(),
            session_ttl_secs: 12 * 3600,
            utc_offset_hours: 8,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Upstream transcription API rejects long uploads; split above this
    pub max_chunk_seconds: f64,
    /// How far back from the nominal boundary to look for a quiet cut point
    pub silence_lookback_seconds: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_chunk_seconds: 600.0,
            silence_lookback_seconds: 5.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub api_key: String,
    #[serde(default = "default_transcription_base")]
    pub base_url: String,
    #[serde(default = "default_transcription_model")]
    pub model: String,
    /// Optional language hint ("zh", "en"); auto-detect when unset
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SummaryConfig {
    pub api_key: String,
    #[serde(default = "default_summary_base")]
    pub base_url: String,
    #[serde(default = "default_summary_model")]
    pub model: String,
    #[serde(default = "default_summary_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_summary_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_line_blob_base() -> String {
    "https://api-data.line.me".to_string()
}

fn default_max_message_chars() -> usize {
    4500
}

fn default_password_seed() -> String {
    "default_seed".to_string()
}

fn default_transcription_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_transcription_model() -> String {
    "whisper-large-v3-turbo".to_string()
}

fn default_summary_base() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_summary_model() -> String {
    "deepseek-chat".to_string()
}

fn default_summary_max_tokens() -> u32 {
    4096
}

fn default_summary_max_input_chars() -> usize {
    200_000
}

fn default_concurrency() -> usize {
    4
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject startup with a clear list of missing secrets
    fn validate(&self) -> Result<()> {
        let required = [
            ("line.channel_secret", &self.line.channel_secret),
            ("line.channel_access_token", &self.line.channel_access_token),
            ("transcription.api_key", &self.transcription.api_key),
            ("summary.api_key", &self.summary.api_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("missing required configuration: {}", missing.join(", "))
        }
    }
}
