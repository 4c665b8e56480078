// ABOUTME: Token counting for logged chat messages
// ABOUTME: BPE counters compatible with common LLM tokenizers plus a character estimate fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token Counter
//!
//! Every message gets its token count exactly once, when it is appended to
//! the ledger. The scheme is picked at startup and shared for the whole
//! process so that aggregated totals stay comparable.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Average characters per token used by the estimate scheme
const CHARS_PER_TOKEN: usize = 4;

/// Deterministic text-to-token-count mapping
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`; the empty string is zero tokens
    fn count(&self, text: &str) -> u32;

    /// Name of the tokenization scheme
    fn scheme(&self) -> TokenizerScheme;
}

/// Supported tokenization schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerScheme {
    /// GPT-3.5/GPT-4 BPE vocabulary
    #[default]
    Cl100kBase,
    /// GPT-4o BPE vocabulary
    O200kBase,
    /// `ceil(chars / 4)` estimate, no vocabulary tables
    Estimate,
}

impl TokenizerScheme {
    /// Configuration name of the scheme
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::O200kBase => "o200k_base",
            Self::Estimate => "estimate",
        }
    }
}

impl fmt::Display for TokenizerScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Ok(Self::Cl100kBase),
            "o200k_base" | "o200k" => Ok(Self::O200kBase),
            "estimate" => Ok(Self::Estimate),
            other => Err(format!(
                "unknown tokenizer '{other}' (expected cl100k_base, o200k_base or estimate)"
            )),
        }
    }
}

/// Byte-pair-encoding counter backed by tiktoken vocabularies
pub struct BpeTokenCounter {
    bpe: CoreBPE,
    scheme: TokenizerScheme,
}

impl BpeTokenCounter {
    /// Load the vocabulary for `scheme`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the vocabulary cannot be loaded or
    /// the scheme is not a BPE scheme
    pub fn new(scheme: TokenizerScheme) -> AppResult<Self> {
        let bpe = match scheme {
            TokenizerScheme::Cl100kBase => tiktoken_rs::cl100k_base(),
            TokenizerScheme::O200kBase => tiktoken_rs::o200k_base(),
            TokenizerScheme::Estimate => {
                return Err(AppError::config(
                    "estimate is not a BPE tokenizer scheme",
                ))
            }
        }
        .map_err(|e| AppError::config(format!("Failed to load {scheme} vocabulary: {e}")))?;

        Ok(Self { bpe, scheme })
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        // Special-token text is counted as ordinary text, never rejected
        let tokens = self.bpe.encode_ordinary(text).len();
        u32::try_from(tokens).unwrap_or(u32::MAX)
    }

    fn scheme(&self) -> TokenizerScheme {
        self.scheme
    }
}

/// Character-length estimate, ~4 characters per token
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateTokenCounter;

impl TokenCounter for EstimateTokenCounter {
    fn count(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        u32::try_from(chars.div_ceil(CHARS_PER_TOKEN)).unwrap_or(u32::MAX)
    }

    fn scheme(&self) -> TokenizerScheme {
        TokenizerScheme::Estimate
    }
}

/// Build the process-wide counter for `scheme`
///
/// # Errors
///
/// Returns a configuration error if a BPE vocabulary fails to load
pub fn build_token_counter(scheme: TokenizerScheme) -> AppResult<Arc<dyn TokenCounter>> {
    let counter: Arc<dyn TokenCounter> = match scheme {
        TokenizerScheme::Estimate => Arc::new(EstimateTokenCounter),
        bpe => Arc::new(BpeTokenCounter::new(bpe)?),
    };
    tracing::info!(scheme = %counter.scheme(), "Token counter initialized");
    Ok(counter)
}
