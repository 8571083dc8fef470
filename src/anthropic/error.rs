//! Tipos de erro para o cliente da API Anthropic.
//!
//! Define [`AnthropicError`] com variantes para rate limiting, erros da API,
//! respostas vazias e erros de rede. Nenhuma delas é retentada: o item que
//! falhou é reportado como falho no relatório do lote.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API da Anthropic.
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// O servidor retornou HTTP 429 (rate limit).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 500 erro interno).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A resposta não trouxe nenhum bloco de texto utilizável.
    #[error("no text content in API response")]
    EmptyResponse,

    /// Falha de rede subjacente (DNS, conexão recusada, timeout) ou corpo
    /// de resposta inválido.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
