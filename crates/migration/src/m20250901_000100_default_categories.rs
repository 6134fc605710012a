//! Seeds the global default categories.
//!
//! These rows have no `user_id`; every user sees them merged with their own
//! categories. The palette matches the colours used in report rendering.

use sea_orm_migration::prelude::*;

use crate::m20250901_000000_init::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

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

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::UserId,
                Categories::Name,
                Categories::Kind,
                Categories::Color,
                Categories::CreatedAt,
            ])
            .to_owned();

        for (name, color) in EXPENSE_DEFAULTS {
            insert.values_panic([
                Option::<i64>::None.into(),
                name.into(),
                "EXPENSE".into(),
                color.into(),
                Expr::current_timestamp().into(),
            ]);
        }
        for (name, color) in INCOME_DEFAULTS {
            insert.values_panic([
                Option::<i64>::None.into(),
                name.into(),
                "INCOME".into(),
                color.into(),
                Expr::current_timestamp().into(),
            ]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Categories::Table)
                    .and_where(Expr::col(Categories::UserId).is_null())
                    .to_owned(),
            )
            .await
    }
}
