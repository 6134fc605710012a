//! Event routing.
//!
//! Every inbound update lands here: commands and free text through
//! [`handle_message`], button presses through [`handle_callback`]. Handler
//! errors are caught at this boundary, logged, and turned into one generic
//! message to the affected user.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Asia::Jakarta;
use ledger::{TransactionKind, UserProfile};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, MessageId, ParseMode, User},
    utils::command::BotCommands,
};

use crate::{
    BotError, ConfigParameters,
    callback::{CallbackIntent, QuickAction},
    commands::Command,
    dialogue::{self, AmountStep, FinishCategory, FinishTransaction},
    state::{CategoryPick, Dialogue},
    ui,
};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.clone() else {
        return Ok(());
    };
    let Some(text) = msg.text().map(ToOwned::to_owned) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let user_id = from.id.0;

    // One event at a time per user, even if the transport delivers updates
    // for the same chat concurrently.
    let _guard = cfg.sessions.user_lock(user_id).await;

    // Text with a command prefix is never dialogue input, even mid-dialogue.
    if text.trim_start().starts_with('/') {
        let me = bot.get_me().await?;
        if let Ok(command) = Command::parse(&text, me.username()) {
            if let Err(err) = execute_command(&bot, chat_id, &from, &cfg, command).await {
                report_failure(&bot, chat_id, &err).await;
            }
        }
        return Ok(());
    }

    // Plain text without an in-flight dialogue is dropped.
    let Some(dialogue) = cfg.sessions.get(user_id).await else {
        return Ok(());
    };

    if let Err(err) = continue_dialogue(&bot, chat_id, user_id, &cfg, dialogue, &text).await {
        report_failure(&bot, chat_id, &err).await;
    }
    Ok(())
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let _guard = cfg.sessions.user_lock(q.from.id.0).await;

    let result = dispatch_callback(&bot, &q, &cfg).await;

    // The transport shows a progress indicator until the callback is
    // acknowledged, so acknowledge on the failure path too.
    match result {
        Ok(None) => {
            let _ = bot.answer_callback_query(q.id.clone()).await;
        }
        Ok(Some(note)) => {
            let _ = bot.answer_callback_query(q.id.clone()).text(note).await;
        }
        Err(err) => {
            tracing::error!("callback handler failed: {err}");
            let _ = bot
                .answer_callback_query(q.id.clone())
                .text("An error occurred")
                .await;
        }
    }
    Ok(())
}

/// Routes one parsed callback intent. Returns an optional short note to
/// attach to the acknowledgement.
async fn dispatch_callback(
    bot: &Bot,
    q: &CallbackQuery,
    cfg: &ConfigParameters,
) -> Result<Option<&'static str>, BotError> {
    let Some(data) = q.data.as_deref() else {
        return Ok(None);
    };
    let Some(intent) = CallbackIntent::parse(data) else {
        tracing::debug!("dropping unknown callback payload: {data}");
        return Ok(None);
    };

    let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        return Ok(None);
    };
    let chat_id = message.chat.id;
    let user_id = q.from.id.0;

    match intent {
        CallbackIntent::ExpenseCategory(id) => {
            select_category(bot, chat_id, message.id, user_id, cfg, TransactionKind::Expense, id)
                .await
        }
        CallbackIntent::IncomeCategory(id) => {
            select_category(bot, chat_id, message.id, user_id, cfg, TransactionKind::Income, id)
                .await
        }
        CallbackIntent::AddNewCategory => {
            if require_user(bot, chat_id, cfg, user_id).await?.is_none() {
                return Ok(None);
            }
            let (text, kb) = ui::render_category_type_picker();
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(kb)
                .await?;
            Ok(None)
        }
        CallbackIntent::AddCategoryKind(kind) => {
            cfg.sessions
                .set(user_id, Dialogue::AwaitingCategoryName { kind })
                .await;
            bot.edit_message_text(chat_id, message.id, ui::render_category_name_prompt(kind))
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(None)
        }
        CallbackIntent::Quick(action) => {
            let command = match action {
                QuickAction::Expense => Command::Expense,
                QuickAction::Income => Command::Income,
                QuickAction::Balance => Command::Balance,
                QuickAction::List => Command::List,
                QuickAction::Help => Command::Help,
                QuickAction::Categories => Command::Categories,
                QuickAction::Report => Command::Report,
            };
            execute_command(bot, chat_id, &q.from, cfg, command).await?;
            Ok(None)
        }
    }
}

/// A category was picked: this is where an expense/income dialogue begins.
async fn select_category(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: u64,
    cfg: &ConfigParameters,
    kind: TransactionKind,
    category_id: i64,
) -> Result<Option<&'static str>, BotError> {
    let Some(category) = cfg.ledger.category_by_id(category_id).await? else {
        // No session was created yet, so there is nothing to clean up.
        return Ok(Some("Category not found"));
    };

    cfg.sessions
        .set(
            user_id,
            Dialogue::AwaitingAmount {
                kind,
                category: CategoryPick {
                    category_id,
                    category_name: category.name.clone(),
                },
            },
        )
        .await;

    bot.edit_message_text(chat_id, message_id, ui::render_amount_prompt(kind, &category.name))
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(None)
}

async fn execute_command(
    bot: &Bot,
    chat_id: ChatId,
    from: &User,
    cfg: &ConfigParameters,
    command: Command,
) -> Result<(), BotError> {
    match command {
        Command::Start => command_start(bot, chat_id, from, cfg).await,
        Command::Help => command_help(bot, chat_id).await,
        Command::Cancel => command_cancel(bot, chat_id, from.id.0, cfg).await,
        Command::Expense => {
            start_transaction_dialogue(bot, chat_id, from.id.0, cfg, TransactionKind::Expense).await
        }
        Command::Income => {
            start_transaction_dialogue(bot, chat_id, from.id.0, cfg, TransactionKind::Income).await
        }
        Command::Balance => command_balance(bot, chat_id, from.id.0, cfg).await,
        Command::List => command_list(bot, chat_id, from.id.0, cfg).await,
        Command::Categories => command_categories(bot, chat_id, from.id.0, cfg).await,
        Command::Report => command_report(bot, chat_id, from.id.0, cfg).await,
    }
}

async fn command_start(
    bot: &Bot,
    chat_id: ChatId,
    from: &User,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    let user = cfg
        .ledger
        .upsert_user(UserProfile {
            telegram_id: from.id.0 as i64,
            username: from.username.clone(),
            first_name: Some(from.first_name.clone()),
            last_name: from.last_name.clone(),
        })
        .await?;

    let (text, kb) = ui::render_welcome(user.first_name.as_deref());
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_help(bot: &Bot, chat_id: ChatId) -> Result<(), BotError> {
    let (text, kb) = ui::render_help();
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_cancel(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    cfg.sessions.remove(user_id).await;
    bot.send_message(chat_id, ui::CANCELLED).await?;
    Ok(())
}

/// Entry point for `/expense` and `/income`: shows the category picker.
/// The dialogue itself starts once a category is picked.
async fn start_transaction_dialogue(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
    kind: TransactionKind,
) -> Result<(), BotError> {
    // Starting over abandons whatever dialogue was in flight.
    cfg.sessions.remove(user_id).await;

    let Some(user) = require_user(bot, chat_id, cfg, user_id).await? else {
        return Ok(());
    };

    let categories = cfg.ledger.categories_for_user(user.id, Some(kind)).await?;
    if categories.is_empty() {
        bot.send_message(chat_id, ui::no_categories(kind)).await?;
        return Ok(());
    }

    let (text, kb) = ui::render_category_picker(kind, &categories);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_balance(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    let Some(user) = require_user(bot, chat_id, cfg, user_id).await? else {
        return Ok(());
    };

    let balance = cfg.ledger.balance(user.id).await?;
    let (text, kb) = ui::render_balance(&balance, today_jakarta());
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_list(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    let Some(user) = require_user(bot, chat_id, cfg, user_id).await? else {
        return Ok(());
    };

    let entries = cfg.ledger.recent_transactions(user.id, 10).await?;
    let (text, kb) = ui::render_list(&entries);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_categories(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    let Some(user) = require_user(bot, chat_id, cfg, user_id).await? else {
        return Ok(());
    };

    let expense = cfg
        .ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await?;
    let income = cfg
        .ledger
        .categories_for_user(user.id, Some(TransactionKind::Income))
        .await?;

    let (text, kb) = ui::render_categories(&expense, &income);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn command_report(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
) -> Result<(), BotError> {
    let Some(user) = require_user(bot, chat_id, cfg, user_id).await? else {
        return Ok(());
    };

    let now = Utc::now().with_timezone(&Jakarta);
    let report = cfg
        .ledger
        .monthly_report(user.id, now.year(), now.month())
        .await?;
    let (text, kb) = ui::render_report(&report);
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(kb)
        .await?;
    Ok(())
}

async fn continue_dialogue(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    cfg: &ConfigParameters,
    dialogue: Dialogue,
    text: &str,
) -> Result<(), BotError> {
    match dialogue {
        Dialogue::AwaitingAmount { kind, category } => {
            match dialogue::handle_amount(&cfg.sessions, user_id, kind, category, text).await {
                AmountStep::Rejected => {
                    bot.send_message(chat_id, ui::INVALID_AMOUNT).await?;
                }
                AmountStep::Advanced(draft) => {
                    bot.send_message(chat_id, ui::render_description_prompt(kind, &draft))
                        .parse_mode(ParseMode::Markdown)
                        .await?;
                }
            }
        }
        Dialogue::AwaitingDescription { kind, draft } => {
            let today = today_jakarta();
            match dialogue::finish_transaction(
                cfg.ledger.as_ref(),
                &cfg.sessions,
                user_id,
                kind,
                draft,
                text,
                today,
            )
            .await?
            {
                FinishTransaction::UserMissing => {
                    bot.send_message(chat_id, ui::USER_NOT_FOUND).await?;
                }
                FinishTransaction::Saved {
                    draft, description, ..
                } => {
                    let (text, kb) =
                        ui::render_transaction_saved(kind, &draft, description.as_deref(), today);
                    bot.send_message(chat_id, text)
                        .parse_mode(ParseMode::Markdown)
                        .reply_markup(kb)
                        .await?;
                }
            }
        }
        Dialogue::AwaitingCategoryName { kind } => {
            match dialogue::finish_category(cfg.ledger.as_ref(), &cfg.sessions, user_id, kind, text)
                .await?
            {
                FinishCategory::NameRequired => {
                    bot.send_message(chat_id, ui::CATEGORY_NAME_REQUIRED).await?;
                }
                FinishCategory::InvalidName => {
                    bot.send_message(chat_id, ui::INVALID_CATEGORY_NAME).await?;
                }
                FinishCategory::UserMissing => {
                    bot.send_message(chat_id, ui::USER_NOT_FOUND).await?;
                }
                FinishCategory::Created(category) => {
                    let (text, kb) = ui::render_category_saved(&category.name, today_jakarta());
                    bot.send_message(chat_id, text)
                        .parse_mode(ParseMode::Markdown)
                        .reply_markup(kb)
                        .await?;
                }
            }
        }
    }
    Ok(())
}

/// Looks the sender up in storage, pointing them at `/start` if unknown.
async fn require_user(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    telegram_id: u64,
) -> Result<Option<ledger::User>, BotError> {
    let user = cfg.ledger.user_by_telegram_id(telegram_id as i64).await?;
    if user.is_none() {
        bot.send_message(chat_id, ui::USER_NOT_FOUND).await?;
    }
    Ok(user)
}

async fn report_failure(bot: &Bot, chat_id: ChatId, err: &BotError) {
    tracing::error!("handler failed: {err}");
    if let Err(send_err) = bot.send_message(chat_id, ui::GENERIC_ERROR).await {
        tracing::warn!("failed to notify user about an error: {send_err}");
    }
}

fn today_jakarta() -> NaiveDate {
    Utc::now().with_timezone(&Jakarta).date_naive()
}
