//! Configuration module
//!
//! Runtime settings for the captioning service: server port, upload root,
//! model checkpoint location, and the ffmpeg/ffprobe binaries used for
//! keyframe sampling. Values come from the environment with constant
//! defaults; protocol-level constants (allowed extensions, body limit,
//! caption token cap) live in [`crate::constants`] and are not env-tunable.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_KEYFRAME_COUNT;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_ROOT: &str = "static/uploads";
const DEFAULT_MODEL_DIR: &str = "models/blip-image-captioning-large";

/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Root directory for stored uploads; `images/` and `videos/` live below it.
    pub upload_root: PathBuf,
    /// Directory holding `model.safetensors` and `tokenizer.json` for the
    /// pretrained checkpoint.
    pub model_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Number of evenly spaced frames sampled per video.
    pub keyframe_count: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the environment, applying defaults.
    /// `.env` is read first when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            upload_root: env::var("UPLOAD_ROOT")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_ROOT.to_string())
                .into(),
            model_dir: env::var("MODEL_DIR")
                .unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
                .into(),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            keyframe_count: env::var("KEYFRAME_COUNT")
                .unwrap_or_else(|_| DEFAULT_KEYFRAME_COUNT.to_string())
                .parse()
                .unwrap_or(DEFAULT_KEYFRAME_COUNT),
            cors_origins,
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on settings that can never work.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.keyframe_count == 0 {
            return Err(anyhow::anyhow!("KEYFRAME_COUNT must be at least 1"));
        }
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ffprobe_path
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframe_count
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: DEFAULT_PORT,
            environment: "development".to_string(),
            upload_root: DEFAULT_UPLOAD_ROOT.into(),
            model_dir: DEFAULT_MODEL_DIR.into(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            keyframe_count: DEFAULT_KEYFRAME_COUNT,
            cors_origins: vec!["*".to_string()],
        }
    }
}
