//! Configuração carregada a partir de `mindmap.toml`.
//!
//! A struct [`AppConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! Variáveis de ambiente têm precedência sobre o arquivo, e flags da CLI
//! têm precedência sobre ambos.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::anthropic::CompletionSettings;
use crate::error::AppError;
use crate::limiter::DEFAULT_CONCURRENCY;

pub const CONFIG_FILE: &str = "mindmap.toml";

/// Configuração de nível superior.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Chave da API Anthropic.
    #[serde(default)]
    pub api_key: String,

    /// Modelo usado para gerar os mapas mentais.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Máximo de gerações simultâneas em um lote.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Diretório de onde os CSVs de entrada são lidos.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Diretório onde os relatórios `*_status.csv` são gravados.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Diretório dos documentos JSON gerados.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Exige token Bearer nas rotas HTTP.
    #[serde(default = "default_use_auth")]
    pub use_auth: bool,

    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("mindmaps")
}

fn default_use_auth() -> bool {
    true
}

fn default_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            concurrency: default_concurrency(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            store_dir: default_store_dir(),
            use_auth: default_use_auth(),
            api_token: String::new(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Carrega `mindmap.toml` do diretório atual e aplica as variáveis de ambiente.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Lê o arquivo indicado; usa os defaults se ele não existir.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&contents)?)
    }

    /// Applies `ANTHROPIC_API_KEY`, `MINDMAP_API_TOKEN`, `MINDMAP_CONCURRENCY`
    /// and `PORT` from `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.api_key = key;
        }
        if let Some(token) = get("MINDMAP_API_TOKEN") {
            self.api_token = token;
        }
        if let Some(raw) = get("MINDMAP_CONCURRENCY") {
            self.concurrency = raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "MINDMAP_CONCURRENCY must be a positive integer, got {raw:?}"
                ))
            })?;
        }
        if let Some(raw) = get("PORT") {
            self.port = raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got {raw:?}")))?;
        }
        Ok(())
    }

    /// Checks settings every generating command depends on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "concurrency must be a positive integer".into(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "no API key configured; set ANTHROPIC_API_KEY or api_key in mindmap.toml".into(),
            ));
        }
        Ok(())
    }

    /// Extra checks before exposing the HTTP surface.
    pub fn validate_for_server(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.use_auth && self.api_token.is_empty() {
            return Err(AppError::Config(
                "use_auth is enabled but no api_token (or MINDMAP_API_TOKEN) is set".into(),
            ));
        }
        Ok(())
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }
}
