//! Telegram bot.
//!
//! The conversational front end: per-user dialogue state lives in memory
//! and storage is reached only through the [`Ledger`] trait, so the bot
//! never touches the database directly.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ledger::{Ledger, LedgerError};
use teloxide::{prelude::*, update_listeners::webhooks};

mod callback;
mod commands;
mod dialogue;
mod handlers;
mod parsing;
mod state;
mod ui;

const EVICTION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Handler-level failures caught at the router boundary.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BotError {
    #[error("storage error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("telegram api error: {0}")]
    Api(#[from] teloxide::RequestError),
}

#[derive(Clone)]
pub(crate) struct ConfigParameters {
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) sessions: state::SessionStore,
}

/// Webhook ingress settings. When absent the bot long-polls.
#[derive(Clone, Debug)]
pub struct Webhook {
    pub url: String,
    pub address: SocketAddr,
}

pub struct Bot {
    token: String,
    ledger: Arc<dyn Ledger>,
    webhook: Option<Webhook>,
    session_idle_timeout: Option<Duration>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting expense tracker bot...");

        let bot = teloxide::Bot::new(&self.token);
        let sessions = state::SessionStore::default();

        // Abandoned dialogues would otherwise be retained forever.
        if let Some(max_idle) = self.session_idle_timeout {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(EVICTION_SWEEP_PERIOD);
                loop {
                    ticker.tick().await;
                    let evicted = sessions.evict_idle(max_idle).await;
                    if evicted > 0 {
                        tracing::debug!("evicted {evicted} idle dialogue(s)");
                    }
                }
            });
        }

        let parameters = ConfigParameters {
            ledger: self.ledger.clone(),
            sessions,
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build();

        match &self.webhook {
            Some(webhook) => {
                let url = match webhook.url.parse() {
                    Ok(url) => url,
                    Err(err) => {
                        tracing::error!("invalid webhook url {:?}: {err}", webhook.url);
                        return;
                    }
                };
                let listener =
                    match webhooks::axum(bot, webhooks::Options::new(webhook.address, url)).await {
                        Ok(listener) => listener,
                        Err(err) => {
                            tracing::error!("failed to start webhook listener: {err}");
                            return;
                        }
                    };
                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text("An error from the update listener"),
                    )
                    .await;
            }
            None => dispatcher.dispatch().await,
        }
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    ledger: Option<Arc<dyn Ledger>>,
    webhook: Option<Webhook>,
    session_idle_timeout: Option<Duration>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn webhook(mut self, url: &str, address: SocketAddr) -> BotBuilder {
        self.webhook = Some(Webhook {
            url: url.to_string(),
            address,
        });
        self
    }

    /// Evicts dialogues that have been idle for longer than `timeout`.
    /// Off by default.
    pub fn session_idle_timeout(mut self, timeout: Duration) -> BotBuilder {
        self.session_idle_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("missing bot token".to_string());
        }
        let ledger = self.ledger.ok_or_else(|| "missing ledger".to_string())?;

        Ok(Bot {
            token: self.token,
            ledger,
            webhook: self.webhook,
            session_idle_timeout: self.session_idle_timeout,
        })
    }
}
