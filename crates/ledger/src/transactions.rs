//! Transaction primitives.
//!
//! A `Transaction` is a single recorded expense or income, always attached
//! to a user and usually to a category. Amounts are integer Rupiah.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Income => "INCOME",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EXPENSE" => Ok(Self::Expense),
            "INCOME" => Ok(Self::Income),
            other => Err(LedgerError::InvalidValue(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

/// A new transaction about to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub category_id: i64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= 0 {
            return Err(LedgerError::InvalidValue(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A transaction joined with the name of its category, as shown in lists
/// and reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionEntry {
    pub transaction: Transaction,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: i64,
    pub kind: String,
    pub description: Option<String>,
    pub transaction_date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl NewTransaction {
    pub(crate) fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(self.user_id),
            category_id: ActiveValue::Set(Some(self.category_id)),
            amount: ActiveValue::Set(self.amount),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            description: ActiveValue::Set(self.description),
            transaction_date: ActiveValue::Set(self.transaction_date),
            created_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            amount: model.amount,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            description: model.description,
            transaction_date: model.transaction_date,
        })
    }
}
