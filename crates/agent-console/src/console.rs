use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::num::NonZeroUsize;

use agent_console_core::{
    ChatDriver, ChatDriverBuilder, ChatSession, TranscriptEntry, TurnError,
    TurnSummary,
};
use agent_console_http_backend::catalog::{
    AgentSummary, ChatSummary, KnowledgeBase, NewDocument, SearchHit,
};
use agent_console_http_backend::{
    ConsoleConfig, Error as BackendError, HttpBackend,
};

use crate::Command;

/// A console builder.
///
/// See [`Console`].
pub struct ConsoleBuilder {
    backend: HttpBackend,
    driver_builder: ChatDriverBuilder,
}

impl ConsoleBuilder {
    /// Creates a console builder talking to the configured service.
    pub fn with_config(config: ConsoleConfig) -> Self {
        let backend = HttpBackend::new(config);
        let driver_builder = ChatDriverBuilder::with_backend(backend.clone());
        Self {
            backend,
            driver_builder,
        }
    }

    /// Sets how many tool-call rounds a single turn may take.
    #[inline]
    pub fn with_max_rounds(mut self, max_rounds: NonZeroUsize) -> Self {
        self.driver_builder =
            self.driver_builder.with_max_rounds(max_rounds.get());
        self
    }

    /// Attaches a callback to be invoked when a transcript entry is added
    /// during a turn.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&TranscriptEntry) + Send + Sync + 'static,
    ) -> Self {
        self.driver_builder = self.driver_builder.on_transcript(on_transcript);
        self
    }

    /// Builds a new console with no agent selected.
    pub fn build(self) -> Console {
        Console {
            backend: self.backend,
            driver: self.driver_builder.build(),
            session: None,
        }
    }
}

/// The state behind the terminal: a backend, a driver and the session with
/// the selected agent, if any.
pub struct Console {
    backend: HttpBackend,
    driver: ChatDriver,
    session: Option<ChatSession>,
}

/// The result of running a [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// The help text should be shown.
    Help,
    /// The selected agent and chat, if any.
    Status {
        /// The selected agent.
        agent_id: Option<String>,
        /// The chat the session is bound to.
        chat_id: Option<String>,
    },
    /// The console should exit.
    Quit,
    /// Agents listed by the service.
    Agents(Vec<AgentSummary>),
    /// An agent was created with this id.
    AgentCreated(String),
    /// This agent is now selected.
    AgentSelected(String),
    /// The next message starts a new chat.
    ConversationReset,
    /// Chats held with the selected agent.
    Chats(Vec<ChatSummary>),
    /// The chat was opened; its history is in the session transcript.
    ChatOpened(String),
    /// Knowledge bases listed by the service.
    KnowledgeBases(Vec<KnowledgeBase>),
    /// A knowledge base was created with this id.
    KnowledgeBaseCreated(String),
    /// A document was uploaded with this id.
    DocumentUploaded(String),
    /// Search results.
    Hits(Vec<SearchHit>),
    /// The answer to a question, if one was found.
    Answer(Option<String>),
    /// A chat turn finished.
    Turn(TurnSummary),
}

/// An error from running a [`Command`].
#[derive(Debug)]
pub enum ConsoleError {
    /// The command needs a selected agent.
    NoAgentSelected,
    /// A service request failed.
    Backend(BackendError),
    /// A chat turn ended early.
    Turn(TurnError),
    /// A local file could not be read.
    Io(std::io::Error),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::NoAgentSelected => {
                write!(f, "no agent selected, pick one with /use <agent_id>")
            }
            ConsoleError::Backend(err) => write!(f, "{err}"),
            ConsoleError::Turn(err) => write!(f, "{err}"),
            ConsoleError::Io(err) => write!(f, "io: {err}"),
        }
    }
}

impl StdError for ConsoleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConsoleError::NoAgentSelected => None,
            ConsoleError::Backend(err) => Some(err),
            ConsoleError::Turn(err) => Some(err),
            ConsoleError::Io(err) => Some(err),
        }
    }
}

impl From<BackendError> for ConsoleError {
    #[inline]
    fn from(err: BackendError) -> Self {
        ConsoleError::Backend(err)
    }
}

impl Console {
    /// Returns the session with the selected agent.
    #[inline]
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Returns the backend the console talks to.
    #[inline]
    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }

    /// Runs a command.
    pub async fn run(
        &mut self,
        command: Command,
    ) -> Result<Output, ConsoleError> {
        let output = match command {
            Command::Help => Output::Help,
            Command::Status => {
                let session = self.session.as_ref();
                Output::Status {
                    agent_id: session.map(|s| s.agent_id().to_owned()),
                    chat_id: session
                        .and_then(|s| s.chat_id())
                        .map(ToOwned::to_owned),
                }
            }
            Command::Quit => Output::Quit,
            Command::ListAgents => {
                Output::Agents(self.backend.list_agents().await?)
            }
            Command::CreateAgent(agent) => {
                Output::AgentCreated(self.backend.create_agent(&agent).await?)
            }
            Command::UseAgent(agent_id) => {
                match &mut self.session {
                    Some(session) => session.switch_agent(agent_id.as_str()),
                    None => {
                        self.session = Some(ChatSession::new(agent_id.as_str()))
                    }
                }
                debug!("selected agent {agent_id}");
                Output::AgentSelected(agent_id)
            }
            Command::NewConversation => {
                self.session_mut()?.start_new_conversation();
                Output::ConversationReset
            }
            Command::ListChats => {
                let agent_id = self.selected_session()?.agent_id();
                Output::Chats(self.backend.list_chats(agent_id).await?)
            }
            Command::OpenChat(chat_id) => {
                // Fail before fetching if there is nothing to open it into.
                self.selected_session()?;
                let history = self.backend.chat_history(&chat_id).await?;
                self.session_mut()?.open_chat(chat_id.as_str(), &history);
                Output::ChatOpened(chat_id)
            }
            Command::ListKnowledgeBases => {
                let knowledge_bases =
                    self.backend.list_knowledge_bases().await?;
                Output::KnowledgeBases(knowledge_bases)
            }
            Command::CreateKnowledgeBase(knowledge_base) => {
                self.backend.create_knowledge_base(&knowledge_base).await?;
                Output::KnowledgeBaseCreated(knowledge_base.knowledge_base_id)
            }
            Command::Upload {
                knowledge_base_id,
                document_id,
                path,
            } => {
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(ConsoleError::Io)?;
                let document = NewDocument {
                    document_id,
                    knowledge_base_id,
                    content,
                };
                self.backend.upload_document(&document).await?;
                Output::DocumentUploaded(document.document_id)
            }
            Command::SemanticSearch(query) => {
                Output::Hits(self.backend.semantic_search(&query).await?)
            }
            Command::ExactSearch(query) => {
                Output::Hits(self.backend.exact_search(&query).await?)
            }
            Command::Ask(question) => {
                Output::Answer(self.backend.ask(&question).await?)
            }
            Command::Message(message) => {
                let session = self
                    .session
                    .as_mut()
                    .ok_or(ConsoleError::NoAgentSelected)?;
                let summary = self
                    .driver
                    .run_turn(session, &message)
                    .await
                    .map_err(ConsoleError::Turn)?;
                Output::Turn(summary)
            }
        };
        Ok(output)
    }

    #[inline]
    fn selected_session(&self) -> Result<&ChatSession, ConsoleError> {
        self.session.as_ref().ok_or(ConsoleError::NoAgentSelected)
    }

    #[inline]
    fn session_mut(&mut self) -> Result<&mut ChatSession, ConsoleError> {
        self.session.as_mut().ok_or(ConsoleError::NoAgentSelected)
    }
}
