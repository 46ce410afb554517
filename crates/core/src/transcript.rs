//! Transcript-related types.

use agent_console_model::HistoryStep;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who a transcript entry comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The operator typing into the console.
    User,
    /// The agent, including markers the console adds on its behalf.
    Assistant,
}

/// A displayed message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub(crate) role: Role,
    pub(crate) content: String,
    pub(crate) timestamp: String,
}

impl TranscriptEntry {
    /// Returns who this entry comes from.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this entry.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when this entry was recorded, as an RFC 3339 string.
    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// An ordered, append-only log of displayed messages.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Builds a transcript from a chat's server-side history.
    ///
    /// Steps without content are skipped.
    pub fn from_history(steps: &[HistoryStep]) -> Self {
        let entries = steps
            .iter()
            .filter_map(|step| {
                let content = step.content.clone()?;
                let role = if step.is_user_message() {
                    Role::User
                } else {
                    Role::Assistant
                };
                Some(TranscriptEntry {
                    role,
                    content,
                    timestamp: step.created_at.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Returns all entries in append order.
    #[inline]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the transcript has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the contents of entries with the given role, in order.
    pub fn contents_of(&self, role: Role) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.role == role)
            .map(|e| e.content.as_str())
            .collect()
    }

    pub(crate) fn push(
        &mut self,
        role: Role,
        content: String,
    ) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry {
            role,
            content,
            timestamp: now(),
        });
        // We just pushed an entry.
        &self.entries[self.entries.len() - 1]
    }
}

#[inline]
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
