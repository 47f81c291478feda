use anyhow::{Error, Result, bail};
use chrono::Local;
use handlebars::Handlebars;
use serde_json::Value;
use uuid::Uuid;

use super::session::SessionStore;
use crate::ai::prompt::{templates, turn_preamble};
use crate::openai::{
    BoxedToolCall, FunctionCall, FunctionCallFn, LanguageModel, Message, Role, ToolChoice,
};

const DEFAULT_MAX_ITERATIONS: usize = 3;

/// The conversational front of the booking assistant. Owns the
/// per-session memory and runs each inbound message through a bounded
/// tool calling loop against the model.
///
/// `chat` never fails. Anything that goes wrong during a turn is
/// logged and turned into an apology for the user.
///
/// Use `BookingAgent::builder()` to construct a valid `BookingAgent`.
pub struct BookingAgent {
    model: LanguageModel,
    tools: Vec<BoxedToolCall>,
    sessions: SessionStore,
    templates: Handlebars<'static>,
    system_message: Option<String>,
    max_iterations: usize,
}

/// A single tool call as sent by the model, with whatever parts of it
/// were usable.
struct RequestedCall {
    id: String,
    name: Option<String>,
    arguments: Option<String>,
}

impl RequestedCall {
    // Models occasionally leave out the ID. One is made up so the tool
    // result can still be paired with the request.
    fn from_value(raw: &Value) -> Self {
        let id = raw["id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
        Self {
            id,
            name: raw["function"]["name"].as_str().map(String::from),
            arguments: raw["function"]["arguments"].as_str().map(String::from),
        }
    }

    fn to_function_call(&self) -> FunctionCall {
        FunctionCall {
            function: FunctionCallFn {
                arguments: self.arguments.clone().unwrap_or_default(),
                name: self.name.clone().unwrap_or_default(),
            },
            id: self.id.clone(),
            r#type: String::from("function"),
        }
    }
}

impl BookingAgent {
    pub fn builder(model: LanguageModel) -> BookingAgentBuilder {
        BookingAgentBuilder::new(model)
    }

    pub fn model(&self) -> &str {
        self.model.model()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one conversational turn for `session_id` and return the
    /// reply. Turns for the same session are handled one at a time.
    pub async fn chat(&self, session_id: &str, message: &str) -> String {
        let session = self.sessions.get_or_create(session_id).await;
        let mut memory = session.lock().await;

        let mut transcript = Vec::with_capacity(memory.len() + 2);
        if let Some(system_message) = &self.system_message {
            transcript.push(Message::new(Role::System, system_message));
        }
        transcript.extend(memory.messages());

        match self.run_turn(transcript, message).await {
            Ok(reply) => {
                memory.push_exchange(message, &reply);
                reply
            }
            Err(e) => {
                tracing::error!("Chat turn failed for session {}: {:?}", session_id, e);
                format!(
                    "I apologize, but I encountered an error: {}. Please try again or rephrase your request.",
                    e
                )
            }
        }
    }

    /// Clear the session's memory. Resetting an unknown or already
    /// empty session does nothing.
    pub async fn reset(&self, session_id: &str) {
        if let Some(session) = self.sessions.get(session_id).await {
            session.lock().await.clear();
            tracing::info!("Cleared conversation history for session {}", session_id);
        }
    }

    pub async fn history_summary(&self, session_id: &str) -> String {
        match self.sessions.get(session_id).await {
            Some(session) => session.lock().await.summary(),
            None => String::from("No conversation history"),
        }
    }

    async fn run_turn(&self, mut transcript: Vec<Message>, message: &str) -> Result<String, Error> {
        // Captured once so every part of the turn agrees on "now"
        let now = Local::now().naive_local();
        let prompt = turn_preamble(&self.templates, now, message)?;
        transcript.push(Message::new(Role::User, &prompt));
        self.route(transcript).await
    }

    /// The tool calling loop. Each iteration either ends with a reply
    /// or runs the requested tools and feeds their results back. When
    /// the iteration cap is hit the model is asked for a final answer
    /// with tools disabled.
    async fn route(&self, mut transcript: Vec<Message>) -> Result<String, Error> {
        for iteration in 1..=self.max_iterations {
            let resp = self
                .model
                .complete(&transcript, &self.tools, ToolChoice::Auto)
                .await?;

            let tool_calls = match resp["choices"][0]["message"]["tool_calls"].as_array() {
                Some(calls) if !calls.is_empty() => calls,
                _ => return reply_content(&resp),
            };

            tracing::debug!(
                "Iteration {}: model requested {} tool call(s)",
                iteration,
                tool_calls.len()
            );
            let messages = self.handle_tool_calls(tool_calls).await;
            transcript.extend(messages);
        }

        tracing::warn!(
            "Reached {} iterations without a reply, generating a final answer",
            self.max_iterations
        );
        let resp = self
            .model
            .complete(&transcript, &self.tools, ToolChoice::None)
            .await?;
        reply_content(&resp)
    }

    /// Run each tool call in the order the model sent them. Returns the
    /// assistant's tool call request followed by one response per call.
    async fn handle_tool_calls(&self, raw_calls: &[Value]) -> Vec<Message> {
        let calls: Vec<RequestedCall> = raw_calls.iter().map(RequestedCall::from_value).collect();

        let mut messages = vec![Message::new_tool_call_request(
            calls.iter().map(RequestedCall::to_function_call).collect(),
        )];
        for call in &calls {
            let result = self.handle_tool_call(call).await;
            messages.push(Message::new_tool_call_response(&result, &call.id));
        }
        messages
    }

    /// Dispatch a single tool call. Malformed calls and tool failures
    /// become the tool result so the model can recover.
    async fn handle_tool_call(&self, call: &RequestedCall) -> String {
        let Some(name) = call.name.as_deref() else {
            tracing::warn!("Tool call {} is missing a function name", call.id);
            return String::from("Error: the tool call is missing a function name.");
        };
        let Some(tool) = self.tools.iter().find(|t| t.function_name() == name) else {
            tracing::warn!("Received tool call that doesn't exist: {}", name);
            let available: Vec<String> = self.tools.iter().map(|t| t.function_name()).collect();
            return format!(
                "Error: there is no tool named '{}'. Available tools: {}",
                name,
                available.join(", ")
            );
        };
        let args = call.arguments.as_deref().unwrap_or_default();

        tracing::debug!("\nTool call: {}\nargs: {}", name, args);

        match tool.call(args).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Tool {} failed: {:?}", name, e);
                e.to_string()
            }
        }
    }
}

fn reply_content(resp: &Value) -> Result<String, Error> {
    match resp["choices"][0]["message"]["content"].as_str() {
        Some(content) => Ok(content.trim().to_string()),
        None => bail!("No message received. Resp:\n\n {}", resp),
    }
}

pub struct BookingAgentBuilder {
    model: LanguageModel,
    tools: Vec<BoxedToolCall>,
    sessions: SessionStore,
    system_message: Option<String>,
    max_iterations: usize,
}

impl BookingAgentBuilder {
    pub fn new(model: LanguageModel) -> Self {
        Self {
            model,
            tools: Vec::new(),
            sessions: SessionStore::new(),
            system_message: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn build(self) -> Result<BookingAgent, Error> {
        Ok(BookingAgent {
            model: self.model,
            tools: self.tools,
            sessions: self.sessions,
            templates: templates()?,
            system_message: self.system_message,
            max_iterations: self.max_iterations,
        })
    }

    pub fn tools(mut self, tools: Vec<BoxedToolCall>) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_message(mut self, system_message: &str) -> Self {
        self.system_message = Some(system_message.to_string());
        self
    }

    pub fn sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Zero is treated as one; the loop always asks the model at least
    /// once before forcing an answer.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }
}
