//! LLM integration for narrative pick explanations.
//!
//! Defines the `PickExplainer` trait, the OpenAI-backed implementation,
//! and an offline fallback that returns the engine's templated text.

pub mod openai;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{PickResult, ValcoachError};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of a follow-up conversation about a pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Abstraction over pick explainers.
///
/// Implementors receive a scored pick (with its raw player record) and
/// return prose for a fan. They never change the pick itself.
#[async_trait]
pub trait PickExplainer: Send + Sync {
    /// Explain a single pick. `region` is the stats region the pick was scored from.
    async fn explain(&self, pick: &PickResult, region: Option<&str>) -> Result<String>;

    /// Answer a follow-up question; `history` ends with the user's question.
    async fn follow_up(
        &self,
        pick: &PickResult,
        region: Option<&str>,
        history: &[ChatTurn],
    ) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

/// Offline explainer: returns the engine's templated explanation.
///
/// Used when no API key is configured. Follow-ups need a real model.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateExplainer;

#[async_trait]
impl PickExplainer for TemplateExplainer {
    async fn explain(&self, pick: &PickResult, _region: Option<&str>) -> Result<String> {
        Ok(pick.explanation.clone())
    }

    async fn follow_up(
        &self,
        _pick: &PickResult,
        _region: Option<&str>,
        _history: &[ChatTurn],
    ) -> Result<String> {
        Err(ValcoachError::Llm {
            model: self.model_name().to_string(),
            message: "follow-up questions need an LLM provider; set an API key".to_string(),
        }
        .into())
    }

    fn model_name(&self) -> &str {
        "template"
    }
}
