//! Dialogue step transitions and terminal actions.
//!
//! The router owns transport concerns; the functions here own validation,
//! session mutation and the terminal persist. Rejected input never advances
//! a dialogue. The terminal step removes the session whether or not the
//! persist succeeded: a failed dialogue has to be restarted, not resumed.

use chrono::NaiveDate;
use ledger::{
    Category, Ledger, LedgerError, NewTransaction, Transaction, TransactionKind, color_for_name,
};

use crate::{
    parsing,
    state::{AmountDraft, CategoryPick, Dialogue, SessionStore},
};

/// Outcome of feeding a message into `AwaitingAmount`.
#[derive(Debug)]
pub enum AmountStep {
    /// Input rejected; the dialogue stays where it was.
    Rejected,
    /// Amount captured; the dialogue now waits for a description.
    Advanced(AmountDraft),
}

pub async fn handle_amount(
    sessions: &SessionStore,
    user_id: u64,
    kind: TransactionKind,
    category: CategoryPick,
    text: &str,
) -> AmountStep {
    let amount = match parsing::parse_amount(text) {
        Some(value) if value > 0 => value,
        _ => return AmountStep::Rejected,
    };

    let draft = AmountDraft {
        category_id: category.category_id,
        category_name: category.category_name,
        amount,
        formatted_amount: parsing::display_amount(text, amount),
    };
    sessions
        .set(
            user_id,
            Dialogue::AwaitingDescription {
                kind,
                draft: draft.clone(),
            },
        )
        .await;
    AmountStep::Advanced(draft)
}

/// Outcome of feeding a message into `AwaitingDescription`.
#[derive(Debug)]
pub enum FinishTransaction {
    /// The user vanished from storage; the dialogue cannot continue.
    UserMissing,
    Saved {
        transaction: Transaction,
        draft: AmountDraft,
        description: Option<String>,
    },
}

pub async fn finish_transaction(
    ledger: &dyn Ledger,
    sessions: &SessionStore,
    user_id: u64,
    kind: TransactionKind,
    draft: AmountDraft,
    text: &str,
    today: NaiveDate,
) -> Result<FinishTransaction, LedgerError> {
    let description = parsing::optional_text(text);

    let user = match ledger.user_by_telegram_id(user_id as i64).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            sessions.remove(user_id).await;
            return Ok(FinishTransaction::UserMissing);
        }
        Err(err) => {
            sessions.remove(user_id).await;
            return Err(err);
        }
    };

    let result = ledger
        .create_transaction(NewTransaction {
            user_id: user.id,
            category_id: draft.category_id,
            amount: draft.amount,
            kind,
            description: description.clone(),
            transaction_date: today,
        })
        .await;

    sessions.remove(user_id).await;

    Ok(FinishTransaction::Saved {
        transaction: result?,
        draft,
        description,
    })
}

/// Outcome of feeding a message into `AwaitingCategoryName`.
#[derive(Debug)]
pub enum FinishCategory {
    /// "skip" or empty input: a name is required here.
    NameRequired,
    /// Name failed validation; the dialogue stays where it was.
    InvalidName,
    UserMissing,
    Created(Category),
}

pub async fn finish_category(
    ledger: &dyn Ledger,
    sessions: &SessionStore,
    user_id: u64,
    kind: TransactionKind,
    text: &str,
) -> Result<FinishCategory, LedgerError> {
    // "skip" means "no name provided"; it never reaches the validator.
    let Some(name) = parsing::optional_text(text) else {
        return Ok(FinishCategory::NameRequired);
    };
    if !parsing::is_valid_category_name(&name) {
        return Ok(FinishCategory::InvalidName);
    }

    let user = match ledger.user_by_telegram_id(user_id as i64).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            sessions.remove(user_id).await;
            return Ok(FinishCategory::UserMissing);
        }
        Err(err) => {
            sessions.remove(user_id).await;
            return Err(err);
        }
    };

    let color = color_for_name(&name, kind);
    let result = ledger.create_category(user.id, &name, kind, &color).await;

    sessions.remove(user_id).await;

    Ok(FinishCategory::Created(result?))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ledger::{Balance, MonthlyReport, TransactionEntry, User, UserProfile};

    use super::*;

    #[derive(Default)]
    struct RecordingLedger {
        user: Option<User>,
        fail_writes: bool,
        transactions: Mutex<Vec<NewTransaction>>,
        categories: Mutex<Vec<(i64, String, TransactionKind, String)>>,
    }

    impl RecordingLedger {
        fn with_user(id: i64, telegram_id: i64) -> Self {
            Self {
                user: Some(User {
                    id,
                    telegram_id,
                    username: None,
                    first_name: Some("Budi".to_string()),
                    last_name: None,
                }),
                ..Self::default()
            }
        }

        fn storage_down() -> LedgerError {
            LedgerError::InvalidValue("storage down".to_string())
        }
    }

    #[async_trait]
    impl Ledger for RecordingLedger {
        async fn upsert_user(&self, _profile: UserProfile) -> Result<User, LedgerError> {
            self.user.clone().ok_or_else(Self::storage_down)
        }

        async fn user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, LedgerError> {
            Ok(self
                .user
                .clone()
                .filter(|user| user.telegram_id == telegram_id))
        }

        async fn categories_for_user(
            &self,
            _user_id: i64,
            _kind: Option<TransactionKind>,
        ) -> Result<Vec<Category>, LedgerError> {
            Ok(Vec::new())
        }

        async fn category_by_id(&self, _id: i64) -> Result<Option<Category>, LedgerError> {
            Ok(None)
        }

        async fn create_category(
            &self,
            user_id: i64,
            name: &str,
            kind: TransactionKind,
            color: &str,
        ) -> Result<Category, LedgerError> {
            if self.fail_writes {
                return Err(Self::storage_down());
            }
            self.categories.lock().unwrap().push((
                user_id,
                name.to_string(),
                kind,
                color.to_string(),
            ));
            Ok(Category {
                id: 99,
                user_id: Some(user_id),
                name: name.to_string(),
                kind,
                color: color.to_string(),
            })
        }

        async fn create_transaction(
            &self,
            new: NewTransaction,
        ) -> Result<Transaction, LedgerError> {
            if self.fail_writes {
                return Err(Self::storage_down());
            }
            self.transactions.lock().unwrap().push(new.clone());
            Ok(Transaction {
                id: 1,
                user_id: new.user_id,
                category_id: Some(new.category_id),
                amount: new.amount,
                kind: new.kind,
                description: new.description,
                transaction_date: new.transaction_date,
            })
        }

        async fn balance(&self, _user_id: i64) -> Result<Balance, LedgerError> {
            Ok(Balance::default())
        }

        async fn recent_transactions(
            &self,
            _user_id: i64,
            _limit: u64,
        ) -> Result<Vec<TransactionEntry>, LedgerError> {
            Ok(Vec::new())
        }

        async fn monthly_report(
            &self,
            _user_id: i64,
            year: i32,
            month: u32,
        ) -> Result<MonthlyReport, LedgerError> {
            Ok(MonthlyReport {
                year,
                month,
                total_income: 0,
                total_expense: 0,
                balance: 0,
                income_by_category: Vec::new(),
                expenses_by_category: Vec::new(),
                transaction_count: 0,
            })
        }
    }

    fn pick(id: i64, name: &str) -> CategoryPick {
        CategoryPick {
            category_id: id,
            category_name: name.to_string(),
        }
    }

    fn awaiting_amount(kind: TransactionKind) -> Dialogue {
        Dialogue::AwaitingAmount {
            kind,
            category: pick(5, "Food & Dining"),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn rejected_amounts_do_not_advance_the_dialogue() {
        let sessions = SessionStore::default();

        for input in ["0", "-5", "abc", ""] {
            sessions.set(7, awaiting_amount(TransactionKind::Expense)).await;
            let step = handle_amount(
                &sessions,
                7,
                TransactionKind::Expense,
                pick(5, "Food & Dining"),
                input,
            )
            .await;
            assert!(matches!(step, AmountStep::Rejected), "input: {input:?}");
            assert_eq!(
                sessions.get(7).await,
                Some(awaiting_amount(TransactionKind::Expense)),
                "input: {input:?}"
            );
        }
    }

    #[tokio::test]
    async fn accepted_amount_moves_to_the_description_step() {
        let sessions = SessionStore::default();
        sessions.set(7, awaiting_amount(TransactionKind::Expense)).await;

        let step = handle_amount(
            &sessions,
            7,
            TransactionKind::Expense,
            pick(5, "Food & Dining"),
            "10.000",
        )
        .await;

        let AmountStep::Advanced(draft) = step else {
            panic!("amount should have been accepted");
        };
        assert_eq!(draft.amount, 10_000);
        assert_eq!(draft.formatted_amount, "Rp10.000");
        assert_eq!(
            sessions.get(7).await,
            Some(Dialogue::AwaitingDescription {
                kind: TransactionKind::Expense,
                draft,
            })
        );
    }

    #[tokio::test]
    async fn full_expense_dialogue_reaches_persistence() {
        let ledger = RecordingLedger::with_user(11, 7);
        let sessions = SessionStore::default();

        sessions.set(7, awaiting_amount(TransactionKind::Expense)).await;
        let AmountStep::Advanced(draft) = handle_amount(
            &sessions,
            7,
            TransactionKind::Expense,
            pick(5, "Food & Dining"),
            "10.000",
        )
        .await
        else {
            panic!("amount should have been accepted");
        };

        let outcome = finish_transaction(
            &ledger,
            &sessions,
            7,
            TransactionKind::Expense,
            draft,
            "skip",
            today(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, FinishTransaction::Saved { .. }));
        let recorded = ledger.transactions.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![NewTransaction {
                user_id: 11,
                category_id: 5,
                amount: 10_000,
                kind: TransactionKind::Expense,
                description: None,
                transaction_date: today(),
            }]
        );
        drop(recorded);
        assert!(sessions.get(7).await.is_none());
    }

    #[tokio::test]
    async fn description_text_is_stored_verbatim() {
        let ledger = RecordingLedger::with_user(11, 7);
        let sessions = SessionStore::default();
        let draft = AmountDraft {
            category_id: 5,
            category_name: "Food & Dining".to_string(),
            amount: 2_500,
            formatted_amount: "Rp2.500".to_string(),
        };
        sessions
            .set(
                7,
                Dialogue::AwaitingDescription {
                    kind: TransactionKind::Income,
                    draft: draft.clone(),
                },
            )
            .await;

        finish_transaction(
            &ledger,
            &sessions,
            7,
            TransactionKind::Income,
            draft,
            "  lunch money  ",
            today(),
        )
        .await
        .unwrap();

        let recorded = ledger.transactions.lock().unwrap();
        assert_eq!(recorded[0].description.as_deref(), Some("lunch money"));
        assert_eq!(recorded[0].kind, TransactionKind::Income);
    }

    #[tokio::test]
    async fn persistence_failure_still_removes_the_session() {
        let ledger = RecordingLedger {
            fail_writes: true,
            ..RecordingLedger::with_user(11, 7)
        };
        let sessions = SessionStore::default();
        let draft = AmountDraft {
            category_id: 5,
            category_name: "Food & Dining".to_string(),
            amount: 10_000,
            formatted_amount: "Rp10.000".to_string(),
        };
        sessions
            .set(
                7,
                Dialogue::AwaitingDescription {
                    kind: TransactionKind::Expense,
                    draft: draft.clone(),
                },
            )
            .await;

        let result = finish_transaction(
            &ledger,
            &sessions,
            7,
            TransactionKind::Expense,
            draft,
            "skip",
            today(),
        )
        .await;

        assert!(result.is_err());
        assert!(sessions.get(7).await.is_none());
    }

    #[tokio::test]
    async fn unknown_user_at_the_terminal_step_removes_the_session() {
        let ledger = RecordingLedger::default();
        let sessions = SessionStore::default();
        let draft = AmountDraft {
            category_id: 5,
            category_name: "Food & Dining".to_string(),
            amount: 10_000,
            formatted_amount: "Rp10.000".to_string(),
        };
        sessions
            .set(
                7,
                Dialogue::AwaitingDescription {
                    kind: TransactionKind::Expense,
                    draft: draft.clone(),
                },
            )
            .await;

        let outcome = finish_transaction(
            &ledger,
            &sessions,
            7,
            TransactionKind::Expense,
            draft,
            "skip",
            today(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, FinishTransaction::UserMissing));
        assert!(sessions.get(7).await.is_none());
    }

    #[tokio::test]
    async fn skip_is_never_a_category_name() {
        let ledger = RecordingLedger::with_user(11, 7);
        let sessions = SessionStore::default();
        sessions
            .set(
                7,
                Dialogue::AwaitingCategoryName {
                    kind: TransactionKind::Expense,
                },
            )
            .await;

        let outcome = finish_category(&ledger, &sessions, 7, TransactionKind::Expense, "skip")
            .await
            .unwrap();

        assert!(matches!(outcome, FinishCategory::NameRequired));
        assert!(ledger.categories.lock().unwrap().is_empty());
        // Re-prompt: the dialogue stays in place.
        assert!(sessions.get(7).await.is_some());
    }

    #[tokio::test]
    async fn invalid_category_names_reprompt_without_persisting() {
        let ledger = RecordingLedger::with_user(11, 7);
        let sessions = SessionStore::default();
        sessions
            .set(
                7,
                Dialogue::AwaitingCategoryName {
                    kind: TransactionKind::Expense,
                },
            )
            .await;

        for input in ["Gas0line", "Gas-Oline", "123"] {
            let outcome = finish_category(&ledger, &sessions, 7, TransactionKind::Expense, input)
                .await
                .unwrap();
            assert!(matches!(outcome, FinishCategory::InvalidName), "input: {input:?}");
        }
        assert!(ledger.categories.lock().unwrap().is_empty());
        assert!(sessions.get(7).await.is_some());
    }

    #[tokio::test]
    async fn valid_category_name_is_persisted_with_a_color() {
        let ledger = RecordingLedger::with_user(11, 7);
        let sessions = SessionStore::default();
        sessions
            .set(
                7,
                Dialogue::AwaitingCategoryName {
                    kind: TransactionKind::Income,
                },
            )
            .await;

        let outcome = finish_category(&ledger, &sessions, 7, TransactionKind::Income, "Bonus")
            .await
            .unwrap();

        let FinishCategory::Created(category) = outcome else {
            panic!("category should have been created");
        };
        assert_eq!(category.name, "Bonus");

        let recorded = ledger.categories.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, 11);
        assert_eq!(recorded[0].2, TransactionKind::Income);
        assert!(recorded[0].3.starts_with('#'));
        drop(recorded);
        assert!(sessions.get(7).await.is_none());
    }
}
