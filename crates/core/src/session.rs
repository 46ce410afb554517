use agent_console_model::HistoryStep;

use crate::transcript::{Role, Transcript, TranscriptEntry};

/// The local state of one conversation with an agent.
///
/// A session starts without a chat id. The first response that carries
/// one assigns it, and from then on it is attached to every request.
/// The caller owns the session and passes it to
/// [`ChatDriver::run_turn`](crate::ChatDriver::run_turn) for every turn.
#[derive(Clone, Debug)]
pub struct ChatSession {
    agent_id: String,
    chat_id: Option<String>,
    transcript: Transcript,
}

impl ChatSession {
    /// Creates an uninitialized session with the given agent.
    #[inline]
    pub fn new<S: Into<String>>(agent_id: S) -> Self {
        Self {
            agent_id: agent_id.into(),
            chat_id: None,
            transcript: Transcript::default(),
        }
    }

    /// Returns the agent this session talks to.
    #[inline]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Returns the chat id, if the chat has been created.
    #[inline]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    /// Returns the transcript of this session.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Adopts a chat id if none is known yet.
    ///
    /// Returns `true` if the id has been adopted. A known id is never
    /// replaced.
    pub fn adopt_chat_id<S: Into<String>>(&mut self, chat_id: S) -> bool {
        let chat_id = chat_id.into();
        match &self.chat_id {
            None => {
                debug!("adopted chat id {chat_id}");
                self.chat_id = Some(chat_id);
                true
            }
            Some(known) if *known == chat_id => false,
            Some(known) => {
                warn!("ignoring chat id {chat_id}, already in chat {known}");
                false
            }
        }
    }

    /// Forgets the current chat, so the next message starts a new one.
    pub fn start_new_conversation(&mut self) {
        self.chat_id = None;
        self.transcript = Transcript::default();
    }

    /// Switches to another agent, forgetting the current chat.
    pub fn switch_agent<S: Into<String>>(&mut self, agent_id: S) {
        self.agent_id = agent_id.into();
        self.start_new_conversation();
    }

    /// Opens an existing chat, replacing the transcript with its history.
    pub fn open_chat<S: Into<String>>(
        &mut self,
        chat_id: S,
        history: &[HistoryStep],
    ) {
        self.chat_id = Some(chat_id.into());
        self.transcript = Transcript::from_history(history);
    }

    pub(crate) fn append(
        &mut self,
        role: Role,
        content: String,
    ) -> &TranscriptEntry {
        self.transcript.push(role, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_is_sticky() {
        let mut session = ChatSession::new("a1");
        assert_eq!(session.chat_id(), None);

        assert!(session.adopt_chat_id("c1"));
        assert!(!session.adopt_chat_id("c1"));
        assert!(!session.adopt_chat_id("c2"));
        assert_eq!(session.chat_id(), Some("c1"));
    }

    #[test]
    fn test_reset() {
        let mut session = ChatSession::new("a1");
        session.adopt_chat_id("c1");
        session.append(Role::User, "hi".to_owned());

        session.start_new_conversation();
        assert_eq!(session.agent_id(), "a1");
        assert_eq!(session.chat_id(), None);
        assert!(session.transcript().is_empty());

        session.adopt_chat_id("c2");
        session.append(Role::User, "hi".to_owned());
        session.switch_agent("a2");
        assert_eq!(session.agent_id(), "a2");
        assert_eq!(session.chat_id(), None);
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_open_chat_replaces_transcript() {
        let mut session = ChatSession::new("a1");
        session.adopt_chat_id("c1");
        session.append(Role::User, "stale".to_owned());

        session.open_chat(
            "c9",
            &[HistoryStep {
                step_type: "user_message".to_owned(),
                content: Some("from history".to_owned()),
                created_at: "2024-05-01T10:00:00Z".to_owned(),
            }],
        );

        assert_eq!(session.chat_id(), Some("c9"));
        assert_eq!(
            session.transcript().contents_of(Role::User),
            ["from history"]
        );
    }
}
