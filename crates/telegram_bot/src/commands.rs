//! Command definitions.

use teloxide::utils::command::BotCommands;

/// Top-level commands. Each one either performs a stateless read or starts
/// a new dialogue, abandoning whatever dialogue was in flight.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "initialize the bot and create your account")]
    Start,
    #[command(description = "show the help guide")]
    Help,
    #[command(description = "cancel the current operation")]
    Cancel,
    #[command(description = "add a new expense")]
    Expense,
    #[command(description = "add new income")]
    Income,
    #[command(description = "view your current balance")]
    Balance,
    #[command(description = "view your recent transactions")]
    List,
    #[command(description = "view all available categories")]
    Categories,
    #[command(description = "generate the monthly report")]
    Report,
}
