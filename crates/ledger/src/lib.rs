//! Persistence layer for the expense tracker.
//!
//! The bot depends only on the [`Ledger`] trait; [`SqlLedger`] is the
//! sea-orm backed implementation used in production.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    prelude::*,
};
use std::collections::BTreeMap;

pub use categories::{Category, color_for_name};
pub use error::LedgerError;
pub use reports::{Balance, MonthlyReport};
pub use transactions::{NewTransaction, Transaction, TransactionEntry, TransactionKind};
pub use users::{User, UserProfile};

mod categories;
mod error;
mod reports;
mod transactions;
mod users;

type ResultLedger<T> = Result<T, LedgerError>;

/// Storage interface consumed by the bot.
///
/// Categories are shared between global defaults (no owner) and per-user
/// rows; every query that lists categories merges the two sets.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Creates the user on first contact, refreshes the profile otherwise.
    async fn upsert_user(&self, profile: UserProfile) -> ResultLedger<User>;

    async fn user_by_telegram_id(&self, telegram_id: i64) -> ResultLedger<Option<User>>;

    /// Global categories plus the user's own, ordered by name.
    async fn categories_for_user(
        &self,
        user_id: i64,
        kind: Option<TransactionKind>,
    ) -> ResultLedger<Vec<Category>>;

    async fn category_by_id(&self, id: i64) -> ResultLedger<Option<Category>>;

    async fn create_category(
        &self,
        user_id: i64,
        name: &str,
        kind: TransactionKind,
        color: &str,
    ) -> ResultLedger<Category>;

    async fn create_transaction(&self, new: NewTransaction) -> ResultLedger<Transaction>;

    async fn balance(&self, user_id: i64) -> ResultLedger<Balance>;

    /// Most recent transactions first, joined with their category names.
    async fn recent_transactions(
        &self,
        user_id: i64,
        limit: u64,
    ) -> ResultLedger<Vec<TransactionEntry>>;

    async fn monthly_report(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> ResultLedger<MonthlyReport>;
}

#[derive(Clone, Debug)]
pub struct SqlLedger {
    database: DatabaseConnection,
}

impl SqlLedger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn sum_for_kind(&self, user_id: i64, kind: TransactionKind) -> ResultLedger<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND kind = ?",
            vec![user_id.into(), kind.as_str().into()],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}

#[async_trait]
impl Ledger for SqlLedger {
    async fn upsert_user(&self, profile: UserProfile) -> ResultLedger<User> {
        let now = Utc::now();
        let existing = users::Entity::find()
            .filter(users::Column::TelegramId.eq(profile.telegram_id))
            .one(&self.database)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: users::ActiveModel = model.into();
                active.username = ActiveValue::Set(profile.username);
                active.first_name = ActiveValue::Set(profile.first_name);
                active.last_name = ActiveValue::Set(profile.last_name);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.database).await?
            }
            None => {
                let created = profile
                    .into_active_model(now)
                    .insert(&self.database)
                    .await?;
                tracing::info!("created user {} for telegram id {}", created.id, created.telegram_id);
                created
            }
        };
        Ok(model.into())
    }

    async fn user_by_telegram_id(&self, telegram_id: i64) -> ResultLedger<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.database)
            .await?;
        Ok(model.map(User::from))
    }

    async fn categories_for_user(
        &self,
        user_id: i64,
        kind: Option<TransactionKind>,
    ) -> ResultLedger<Vec<Category>> {
        let mut query = categories::Entity::find().filter(
            Condition::any()
                .add(categories::Column::UserId.is_null())
                .add(categories::Column::UserId.eq(user_id)),
        );
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }

        let models = query
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    async fn category_by_id(&self, id: i64) -> ResultLedger<Option<Category>> {
        let model = categories::Entity::find_by_id(id).one(&self.database).await?;
        model.map(Category::try_from).transpose()
    }

    async fn create_category(
        &self,
        user_id: i64,
        name: &str,
        kind: TransactionKind,
        color: &str,
    ) -> ResultLedger<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidValue(
                "category name must not be empty".to_string(),
            ));
        }

        let category = Category {
            id: 0,
            user_id: Some(user_id),
            name: name.to_string(),
            kind,
            color: color.to_string(),
        };
        let model = category
            .into_active_model(Utc::now())
            .insert(&self.database)
            .await?;
        Category::try_from(model)
    }

    async fn create_transaction(&self, new: NewTransaction) -> ResultLedger<Transaction> {
        new.validate()?;
        let model = new
            .into_active_model(Utc::now())
            .insert(&self.database)
            .await?;
        Transaction::try_from(model)
    }

    async fn balance(&self, user_id: i64) -> ResultLedger<Balance> {
        let total_income = self.sum_for_kind(user_id, TransactionKind::Income).await?;
        let total_expense = self.sum_for_kind(user_id, TransactionKind::Expense).await?;
        let transaction_count = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .count(&self.database)
            .await?;

        Ok(Balance {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            transaction_count,
        })
    }

    async fn recent_transactions(
        &self,
        user_id: i64,
        limit: u64,
    ) -> ResultLedger<Vec<TransactionEntry>> {
        let rows: Vec<(transactions::Model, Option<categories::Model>)> =
            transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_desc(transactions::Column::TransactionDate)
                .order_by_desc(transactions::Column::CreatedAt)
                .limit(limit)
                .find_also_related(categories::Entity)
                .all(&self.database)
                .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (tx_model, cat_model) in rows {
            out.push(TransactionEntry {
                transaction: Transaction::try_from(tx_model)?,
                category_name: cat_model.map(|c| c.name),
            });
        }
        Ok(out)
    }

    async fn monthly_report(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> ResultLedger<MonthlyReport> {
        let invalid = || LedgerError::InvalidValue(format!("invalid month: {year}-{month}"));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;

        let rows: Vec<(transactions::Model, Option<categories::Model>)> =
            transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::TransactionDate.gte(start))
                .filter(transactions::Column::TransactionDate.lt(end))
                .find_also_related(categories::Entity)
                .all(&self.database)
                .await?;

        let transaction_count = rows.len();
        let mut total_income = 0;
        let mut total_expense = 0;
        let mut income_by_category: BTreeMap<String, i64> = BTreeMap::new();
        let mut expenses_by_category: BTreeMap<String, i64> = BTreeMap::new();

        for (tx_model, cat_model) in rows {
            let tx = Transaction::try_from(tx_model)?;
            let name = cat_model
                .map(|c| c.name)
                .unwrap_or_else(|| "No Category".to_string());
            match tx.kind {
                TransactionKind::Income => {
                    total_income += tx.amount;
                    *income_by_category.entry(name).or_insert(0) += tx.amount;
                }
                TransactionKind::Expense => {
                    total_expense += tx.amount;
                    *expenses_by_category.entry(name).or_insert(0) += tx.amount;
                }
            }
        }

        Ok(MonthlyReport {
            year,
            month,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            income_by_category: income_by_category.into_iter().collect(),
            expenses_by_category: expenses_by_category.into_iter().collect(),
            transaction_count,
        })
    }
}
