use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecsConfig {
    pub epsilon: f64,
    pub max_candidates: usize,
    pub anti_repeat_days: u32,
    pub prefer_curated: bool,
    pub require_tags: bool,
    pub min_curated: usize,
    pub explore_top_k: usize,
    pub weight_multiplier: f64,
}

impl Default for RecsConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.30,
            max_candidates: 500,
            anti_repeat_days: 90,
            prefer_curated: true,
            require_tags: false,
            min_curated: 5,
            explore_top_k: 20,
            weight_multiplier: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub recs: RecsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(epsilon) = env::var("RECS_EPSILON") {
            if let Ok(value) = epsilon.parse::<f64>() {
                self.recs.epsilon = value.clamp(0.0, 1.0);
            }
        }
        if let Ok(max_candidates) = env::var("RECS_MAX_CANDIDATES") {
            if let Ok(value) = max_candidates.parse::<usize>() {
                self.recs.max_candidates = value;
            }
        }
        if let Ok(days) = env::var("RECS_ANTI_REPEAT_DAYS") {
            if let Ok(value) = days.parse::<u32>() {
                self.recs.anti_repeat_days = value;
            }
        }
        if let Ok(prefer) = env::var("RECS_PREFER_CURATED") {
            self.recs.prefer_curated = parse_bool(&prefer);
        }
        if let Ok(require) = env::var("RECS_REQUIRE_TAGS") {
            self.recs.require_tags = parse_bool(&require);
        }
        if let Ok(enabled) = env::var("LLM_ENABLED") {
            self.llm.enabled = parse_bool(&enabled);
        }
        if let Ok(api_base) = env::var("LLM_API_BASE") {
            if !api_base.trim().is_empty() {
                self.llm.api_base = api_base;
            }
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(timeout) = env::var("LLM_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.llm.timeout_ms = value;
            }
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn default_config_path() -> Option<PathBuf> {
    env::var("MOODPICK_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/moodpick.toml")))
}
