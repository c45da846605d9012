//! Prompt templates for pick explanations and follow-up questions.
//!
//! Each prompt carries the scored pick plus every field of the raw player
//! record, so the model explains from the numbers it is given instead of
//! inventing match history.

use serde::{Deserialize, Serialize};

use crate::types::{PickResult, PlayerRecord};

use super::ChatTurn;

// ---------------------------------------------------------------------------
// Message type
// ---------------------------------------------------------------------------

/// One chat-completions message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

pub const SYSTEM_PROMPT: &str = "You are VALCoach, an esports betting assistant for Valorant.\n\
\n\
You:\n\
- Explain picks to a fan in clear, friendly language.\n\
- Always ground your reasoning in the stats you are given \
(kills/assists per map, rating, KAST, consistency, edge, line, probability, etc.).\n\
- Never invent stats or match history beyond what is provided.\n\
- If you don't have some info, say so briefly instead of guessing.\n\
\n\
Style:\n\
- First, list 3-6 bullet points that highlight the most important numbers.\n\
- Then write 1-2 short paragraphs explaining the recommendation \
(why Lean Over / Lean Under / Stay Away) in plain English.\n\
- Be concise but specific; name the stats when you use them.";

// ---------------------------------------------------------------------------
// Context blocks
// ---------------------------------------------------------------------------

/// Every player field as `- key: value`, sorted by key.
pub fn player_context(player: &PlayerRecord) -> String {
    let value = serde_json::to_value(player).unwrap_or_default();
    let Some(fields) = value.as_object() else {
        return String::new();
    };

    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();

    keys.into_iter()
        .map(|k| {
            let v = match &fields[k] {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("- {k}: {v}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact summary of the scored pick. `region` is the slate's stats region.
pub fn pick_summary(pick: &PickResult, region: Option<&str>) -> String {
    format!(
        "Player: {}\n\
         Team: {}\n\
         Region (if present): {}\n\
         Role: {}\n\
         Stat type: {}\n\
         Line: {:.1}\n\
         Projection: {:.1}\n\
         Edge: {:.2}\n\
         P(Over): {:.1}%\n\
         Recommendation: {} ({} confidence)",
        pick.player_handle,
        pick.team_name,
        region.map(str::trim).filter(|r| !r.is_empty()).unwrap_or("unknown"),
        pick.role,
        pick.stat_type,
        pick.line_value,
        pick.projected_value,
        pick.edge,
        pick.probability_over * 100.0,
        pick.recommendation,
        pick.confidence,
    )
}

/// The user message carrying all context for a pick.
pub fn context_message(pick: &PickResult, region: Option<&str>) -> String {
    format!(
        "Here is all the structured context we have for this player and matchup.\n\
         \n\
         === PICK SUMMARY ===\n\
         {}\n\
         \n\
         === RAW PLAYER STATS ===\n\
         {}\n\
         \n\
         Using ONLY this information, explain to a Valorant fan why this is the \
         recommendation. Follow the style rules from the system prompt.",
        pick_summary(pick, region),
        player_context(&pick.raw_player),
    )
}

// ---------------------------------------------------------------------------
// Message lists
// ---------------------------------------------------------------------------

/// System prompt + context, for the first explanation of a pick.
pub fn initial_messages(pick: &PickResult, region: Option<&str>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new("system", SYSTEM_PROMPT),
        ChatMessage::new("user", context_message(pick, region)),
    ]
}

/// System prompt, context replayed as an assistant turn, then the chat so far.
pub fn followup_messages(
    pick: &PickResult,
    region: Option<&str>,
    history: &[ChatTurn],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.push(ChatMessage::new("assistant", context_message(pick, region)));
    messages.extend(
        history
            .iter()
            .map(|turn| ChatMessage::new(turn.role.as_str(), turn.content.clone())),
    );
    messages
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
