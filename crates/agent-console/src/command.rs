//! Parsing of console input lines.

use std::error::Error;
use std::fmt::{self, Display};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use agent_console_http_backend::catalog::{
    ExactQuery, KnowledgeBase, NewAgent, Question, SemanticQuery,
};

/// Help text listing every command.
pub const HELP: &str = "\
/help                                       show this help
/status                                     show the selected agent and chat
/agents                                     list agents
/create-agent <name> | <description> | <instructions>
/use <agent_id>                             select an agent
/new                                        start a new conversation
/chats                                      list chats with the selected agent
/open <chat_id>                             reopen a chat from its history
/kbs                                        list knowledge bases
/create-kb <id> | <name> | <description>
/upload <kb_id> <document_id> <path>        upload a text file
/semantic <kb_ids> <count> <query>          semantic search
/exact <kb_ids> <count> <text>              exact text search
/ask <kb_ids> <question>                    ask a question
/quit                                       leave the console
Anything else is sent to the selected agent. <kb_ids> is comma-separated.";

/// A parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the help text.
    Help,
    /// Show the selected agent and chat.
    Status,
    /// Leave the console.
    Quit,
    /// List agents.
    ListAgents,
    /// Create an agent.
    CreateAgent(NewAgent),
    /// Select an agent, starting a new conversation with it.
    UseAgent(String),
    /// Start a new conversation with the selected agent.
    NewConversation,
    /// List chats with the selected agent.
    ListChats,
    /// Reopen a chat from its history.
    OpenChat(String),
    /// List knowledge bases.
    ListKnowledgeBases,
    /// Create a knowledge base.
    CreateKnowledgeBase(KnowledgeBase),
    /// Upload a text file as a document.
    Upload {
        /// The knowledge base to upload into.
        knowledge_base_id: String,
        /// The document id.
        document_id: String,
        /// The file to read.
        path: PathBuf,
    },
    /// Run a semantic search.
    SemanticSearch(SemanticQuery),
    /// Run an exact text search.
    ExactSearch(ExactQuery),
    /// Ask a question.
    Ask(Question),
    /// Send a chat message to the selected agent.
    Message(String),
}

/// An input line that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError(String);

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ParseError {}

impl Command {
    /// Parses an input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Some(Command::Message(line.to_owned())));
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((command, ""));

        let command = match name {
            "help" => Command::Help,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            "agents" => Command::ListAgents,
            "create-agent" => {
                let usage = "<name> | <description> | <instructions>";
                let [name, description, instructions] =
                    pipe_fields(rest, usage)?;
                Command::CreateAgent(NewAgent {
                    name,
                    description,
                    instructions,
                })
            }
            "use" => Command::UseAgent(single_arg(rest, "<agent_id>")?),
            "new" => Command::NewConversation,
            "chats" => Command::ListChats,
            "open" => Command::OpenChat(single_arg(rest, "<chat_id>")?),
            "kbs" => Command::ListKnowledgeBases,
            "create-kb" => {
                let [knowledge_base_id, name, description] =
                    pipe_fields(rest, "<id> | <name> | <description>")?;
                Command::CreateKnowledgeBase(KnowledgeBase {
                    knowledge_base_id,
                    name,
                    description: Some(description),
                })
            }
            "upload" => {
                let usage = "<kb_id> <document_id> <path>";
                let mut args = rest.splitn(3, char::is_whitespace);
                let (Some(kb), Some(doc), Some(path)) =
                    (args.next(), args.next(), args.next())
                else {
                    return Err(usage_error(usage));
                };
                Command::Upload {
                    knowledge_base_id: kb.to_owned(),
                    document_id: doc.to_owned(),
                    path: PathBuf::from(path.trim()),
                }
            }
            "semantic" => {
                let (knowledge_base_ids, count, query) =
                    search_args(rest, "<kb_ids> <count> <query>")?;
                Command::SemanticSearch(SemanticQuery {
                    query,
                    knowledge_base_ids,
                    count,
                })
            }
            "exact" => {
                let (knowledge_base_ids, count, text) =
                    search_args(rest, "<kb_ids> <count> <text>")?;
                Command::ExactSearch(ExactQuery {
                    text,
                    knowledge_base_ids,
                    count,
                })
            }
            "ask" => {
                let usage = "<kb_ids> <question>";
                let Some((kb_ids, question)) =
                    rest.split_once(char::is_whitespace)
                else {
                    return Err(usage_error(usage));
                };
                Command::Ask(Question {
                    knowledge_base_ids: kb_id_list(kb_ids, usage)?,
                    question: question.trim().to_owned(),
                })
            }
            other => {
                return Err(ParseError(format!(
                    "unknown command /{other}, try /help"
                )));
            }
        };
        Ok(Some(command))
    }
}

/// Parses a round limit, which must be a positive integer.
pub fn parse_max_rounds(value: &str) -> Result<NonZeroUsize, ParseError> {
    value.trim().parse().map_err(|_| {
        ParseError(format!(
            "invalid round limit `{value}`, expected a positive integer"
        ))
    })
}

#[inline]
fn usage_error(usage: &str) -> ParseError {
    ParseError(format!("usage: {usage}"))
}

fn single_arg(rest: &str, usage: &str) -> Result<String, ParseError> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(usage_error(usage));
    }
    Ok(rest.to_owned())
}

fn pipe_fields(rest: &str, usage: &str) -> Result<[String; 3], ParseError> {
    let fields: Vec<_> = rest.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [a, b, c] if !a.is_empty() => {
            Ok([(*a).to_owned(), (*b).to_owned(), (*c).to_owned()])
        }
        _ => Err(usage_error(usage)),
    }
}

fn kb_id_list(list: &str, usage: &str) -> Result<Vec<String>, ParseError> {
    let ids: Vec<_> = list
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if ids.is_empty() {
        return Err(usage_error(usage));
    }
    Ok(ids)
}

fn search_args(
    rest: &str,
    usage: &str,
) -> Result<(Vec<String>, u32, String), ParseError> {
    let mut args = rest.splitn(3, char::is_whitespace);
    let (Some(kb_ids), Some(count), Some(text)) =
        (args.next(), args.next(), args.next())
    else {
        return Err(usage_error(usage));
    };
    let count = count.parse().map_err(|_| usage_error(usage))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(usage_error(usage));
    }
    Ok((kb_id_list(kb_ids, usage)?, count, text.to_owned()))
}
