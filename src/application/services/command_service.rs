use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandRegistry, Invocation, Message};
use crate::infrastructure::database::Database;

/// Service for managing and executing prefixed chat commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
    admins: Vec<String>,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>, admins: Vec<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
            admins,
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self, bot_name: &str, db: Arc<Database>) {
        self.register(Command::new("help")
            .with_description("Show this message")
            .with_aliases(vec!["menu".to_string()]));

        self.register(Command::new("ping")
            .with_description("Check that the bot is alive")
            .with_handler(|_| Ok("pong".to_string())));

        let info = format!("{} v{}", bot_name, env!("CARGO_PKG_VERSION"));
        self.register(Command::new("info")
            .with_description("Show bot version")
            .with_handler(move |_| Ok(info.clone())));

        let stats_db = Arc::clone(&db);
        self.register(Command::new("stats")
            .with_description("Show activity counters")
            .admin_only()
            .with_handler(move |_| {
                let stats = stats_db.stats()
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                Ok(format!(
                    "Groups: {}\nMembers: {}\nMessages: {}\nJoins: {}\nLeaves: {}\nModeration actions: {}",
                    stats.groups, stats.members, stats.messages, stats.joins, stats.leaves, stats.moderation_actions
                ))
            }));

        self.register(Command::new("setwelcome")
            .with_description("Set this group's welcome message")
            .with_usage("setwelcome <text with {user} and {group}>")
            .admin_only()
            .with_handler(move |inv| {
                if !inv.is_group {
                    return Err(CommandError::InvalidArgs("only available in groups".to_string()));
                }
                let text = inv.rest();
                if text.is_empty() {
                    return Err(CommandError::InvalidArgs("welcome text is empty".to_string()));
                }
                db.set_welcome_message(&inv.chat_id, &text)
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                Ok("Welcome message updated.".to_string())
            }));

        // Rendered once every default command is registered
        let help = self.help_text();
        if let Some(cmd) = self.registry.get_mut("help") {
            cmd.handler = Some(Box::new(move |_| Ok(help.clone())));
        }
    }

    /// Split a prefixed message body into command name and arguments
    pub fn parse<'a>(&self, body: &'a str) -> Option<(&'a str, Vec<String>)> {
        let rest = body.trim().strip_prefix(self.prefix.as_str())?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?;
        Some((name, parts.map(|s| s.to_string()).collect()))
    }

    pub fn is_admin(&self, sender_id: &str) -> bool {
        self.admins.iter().any(|a| a == sender_id)
    }

    /// Run the command in `message`, if any, returning the reply text
    pub fn handle(&self, message: &Message) -> Result<Option<String>, CommandError> {
        let Some((name, args)) = self.parse(&message.body) else {
            return Ok(None);
        };

        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        if cmd.admin_only && !self.is_admin(&message.sender_id) {
            return Err(CommandError::PermissionDenied);
        }

        let invocation = Invocation {
            chat_id: message.chat_id.clone(),
            sender_id: message.sender_id.clone(),
            args,
            is_group: message.is_group,
        };

        if let Some(handler) = &cmd.handler {
            Ok(Some(handler(&invocation)?))
        } else {
            Ok(Some(format!("Command {} not implemented", cmd.name)))
        }
    }

    fn help_text(&self) -> String {
        let mut help = "Available commands:\n".to_string();
        for cmd in self.registry.all() {
            let usage = cmd.usage.as_deref().unwrap_or(cmd.name.as_str());
            help.push_str(&format!("{}{} - {}", self.prefix, usage, cmd.description.as_deref().unwrap_or("")));
            if cmd.admin_only {
                help.push_str(" (admin)");
            }
            help.push('\n');
        }
        help
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
