//! Host-facing plugin surface.
//!
//! # Design
//! The host defines a fixed set of lifecycle hooks. Instead of overriding a
//! stub for every hook, a plugin answers `can_handle` per `Hook` and
//! overrides only the handlers it actually implements; the trait's default
//! handlers pass their input through unchanged.
//!
//! `RestApiPlugin` implements a single hook, `PostPrompt`, where it
//! registers the `send_rest_request` command backed by `RequestExecutor`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TransportConfig;
use crate::error::{ConfigError, ExecuteError};
use crate::executor::RequestExecutor;

pub const PLUGIN_NAME: &str = "Auto-GPT-REST-API-Plugin";
pub const PLUGIN_VERSION: &str = "0.1.0";
pub const PLUGIN_DESCRIPTION: &str = "Auto-GPT REST API Plugin: Supercharge REST API management.";

pub const COMMAND_LABEL: &str = "Send REST Request";
pub const COMMAND_NAME: &str = "send_rest_request";

/// Lifecycle hooks exposed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// The prompt is being assembled; plugins may register commands.
    PostPrompt,
    OnResponse,
    OnPlanning,
    PostPlanning,
    PreInstruction,
    OnInstruction,
    PostInstruction,
    PreCommand,
    PostCommand,
    ChatCompletion,
}

impl Hook {
    pub const ALL: [Hook; 10] = [
        Hook::PostPrompt,
        Hook::OnResponse,
        Hook::OnPlanning,
        Hook::PostPlanning,
        Hook::PreInstruction,
        Hook::OnInstruction,
        Hook::PostInstruction,
        Hook::PreCommand,
        Hook::PostCommand,
        Hook::ChatCompletion,
    ];
}

/// One chat message as seen by the message-carrying hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Named arguments supplied by the agent when it invokes a command.
pub type CommandArgs = BTreeMap<String, String>;

type CommandFn = dyn Fn(&CommandArgs) -> Result<String, ExecuteError> + Send + Sync;

/// A command a plugin offers to the agent.
#[derive(Clone)]
pub struct Command {
    pub label: String,
    pub name: String,
    /// Argument name to placeholder text shown in the prompt, in prompt order.
    pub args: Vec<(String, String)>,
    handler: Arc<CommandFn>,
}

impl Command {
    pub fn new<F>(label: &str, name: &str, args: &[(&str, &str)], handler: F) -> Self
    where
        F: Fn(&CommandArgs) -> Result<String, ExecuteError> + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            name: name.to_string(),
            args: args
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            handler: Arc::new(handler),
        }
    }

    pub fn invoke(&self, args: &CommandArgs) -> Result<String, ExecuteError> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("label", &self.label)
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// The host's prompt builder, reduced to the part plugins touch.
pub trait PromptGenerator {
    fn add_command(&mut self, command: Command);
}

/// A `PromptGenerator` that keeps commands in registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn invoke(&self, name: &str, args: &CommandArgs) -> Result<String, ExecuteError> {
        self.get(name)
            .ok_or_else(|| ExecuteError::UnknownCommand(name.to_string()))?
            .invoke(args)
    }
}

impl PromptGenerator for CommandRegistry {
    fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// A plugin loaded by the host.
///
/// The host calls a handler only after `can_handle` returned true for its
/// hook. Every handler has a pass-through default.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str;

    fn can_handle(&self, _hook: Hook) -> bool {
        false
    }

    fn post_prompt(&self, _prompt: &mut dyn PromptGenerator) {}

    fn on_response(&self, response: String) -> String {
        response
    }

    fn on_planning(
        &self,
        _prompt: &mut dyn PromptGenerator,
        _messages: &[Message],
    ) -> Option<String> {
        None
    }

    fn post_planning(&self, response: String) -> String {
        response
    }

    fn pre_instruction(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
    }

    fn on_instruction(&self, _messages: &[Message]) -> Option<String> {
        None
    }

    fn post_instruction(&self, response: String) -> String {
        response
    }

    fn pre_command(&self, command_name: String, arguments: CommandArgs) -> (String, CommandArgs) {
        (command_name, arguments)
    }

    fn post_command(&self, _command_name: &str, response: String) -> String {
        response
    }

    fn handle_chat_completion(
        &self,
        _messages: &[Message],
        _model: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Option<String> {
        None
    }
}

/// Lets an agent send arbitrary REST requests.
#[derive(Debug, Clone, Default)]
pub struct RestApiPlugin {
    executor: RequestExecutor,
}

impl RestApiPlugin {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let config = TransportConfig::from_env()?;
        Ok(Self::new(RequestExecutor::from_config(&config)))
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    fn send_rest_request(
        executor: &RequestExecutor,
        args: &CommandArgs,
    ) -> Result<String, ExecuteError> {
        let method = args
            .get("method")
            .ok_or(ExecuteError::MissingArgument("method"))?;
        let url = args.get("url").ok_or(ExecuteError::MissingArgument("url"))?;
        executor.execute(
            method,
            url,
            args.get("headers").map(String::as_str),
            args.get("body").map(String::as_str),
        )
    }
}

impl Plugin for RestApiPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn description(&self) -> &str {
        PLUGIN_DESCRIPTION
    }

    fn can_handle(&self, hook: Hook) -> bool {
        hook == Hook::PostPrompt
    }

    fn post_prompt(&self, prompt: &mut dyn PromptGenerator) {
        let executor = self.executor.clone();
        prompt.add_command(Command::new(
            COMMAND_LABEL,
            COMMAND_NAME,
            &[
                ("method", "<HTTP method>"),
                ("url", "<url>"),
                ("headers", "<headers as JSON>"),
                ("body", "<body as JSON>"),
            ],
            move |args| Self::send_rest_request(&executor, args),
        ));
    }
}
