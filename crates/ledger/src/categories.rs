//! Transaction categories.
//!
//! Rows without a `user_id` are global defaults visible to every user; rows
//! with a `user_id` belong to that user only. Both sets are merged when a
//! user lists their categories.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, transactions::TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub kind: TransactionKind,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub kind: String,
    pub color: String,
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
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            color: model.color,
        })
    }
}

impl Category {
    pub(crate) fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(self.user_id),
            name: ActiveValue::Set(self.name),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            color: ActiveValue::Set(self.color),
            created_at: ActiveValue::Set(now),
        }
    }
}

/// Default palette, matching the seeded global categories.
const EXPENSE_DEFAULTS: [(&str, &str); 8] = [
    ("Food & Dining", "#ff6b6b"),
    ("Transportation", "#4ecdc4"),
    ("Shopping", "#45b7d1"),
    ("Entertainment", "#96ceb4"),
    ("Bills & Utilities", "#feca57"),
    ("Healthcare", "#ff9ff3"),
    ("Education", "#54a0ff"),
    ("Other", "#5f27cd"),
];

const INCOME_DEFAULTS: [(&str, &str); 5] = [
    ("Salary", "#00d2d3"),
    ("Freelance", "#ff9f43"),
    ("Investment", "#10ac84"),
    ("Gift", "#ee5a6f"),
    ("Other", "#0984e3"),
];

/// Returns the display colour for a category name.
///
/// Names matching a default category reuse the seeded palette; any other
/// name gets a colour derived from a stable hash so the same name always
/// renders the same.
pub fn color_for_name(name: &str, kind: TransactionKind) -> String {
    let normalized = name.trim().to_lowercase();
    let defaults = match kind {
        TransactionKind::Expense => EXPENSE_DEFAULTS.as_slice(),
        TransactionKind::Income => INCOME_DEFAULTS.as_slice(),
    };

    if let Some((_, color)) = defaults
        .iter()
        .find(|(default, _)| default.to_lowercase() == normalized)
    {
        return (*color).to_string();
    }

    let mut hash: i32 = 0;
    for c in name.chars() {
        hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }

    let mut color = String::from("#");
    for i in 0..3 {
        let value = (hash >> (i * 8)) & 0xff;
        color.push_str(&format!("{value:02x}"));
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_use_palette_colors() {
        assert_eq!(
            color_for_name("Food & Dining", TransactionKind::Expense),
            "#ff6b6b"
        );
        assert_eq!(
            color_for_name("salary", TransactionKind::Income),
            "#00d2d3"
        );
    }

    #[test]
    fn other_resolves_per_kind() {
        assert_eq!(color_for_name("Other", TransactionKind::Expense), "#5f27cd");
        assert_eq!(color_for_name("Other", TransactionKind::Income), "#0984e3");
    }

    #[test]
    fn unknown_names_get_a_stable_hash_color() {
        let first = color_for_name("Gasoline", TransactionKind::Expense);
        let second = color_for_name("Gasoline", TransactionKind::Expense);
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
        assert!(first.starts_with('#'));
    }
}
