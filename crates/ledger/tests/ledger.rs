use chrono::NaiveDate;
use sea_orm::Database;

use ledger::{Ledger, NewTransaction, SqlLedger, TransactionKind, UserProfile};
use migration::MigratorTrait;

async fn ledger_with_db() -> SqlLedger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    SqlLedger::new(db)
}

fn profile(telegram_id: i64, first_name: &str) -> UserProfile {
    UserProfile {
        telegram_id,
        username: Some(format!("user{telegram_id}")),
        first_name: Some(first_name.to_string()),
        last_name: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[tokio::test]
async fn upsert_creates_then_refreshes_profile() {
    let ledger = ledger_with_db().await;

    let created = ledger.upsert_user(profile(42, "Budi")).await.unwrap();
    assert_eq!(created.telegram_id, 42);
    assert_eq!(created.first_name.as_deref(), Some("Budi"));

    let updated = ledger.upsert_user(profile(42, "Budi Santoso")).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.first_name.as_deref(), Some("Budi Santoso"));

    let found = ledger.user_by_telegram_id(42).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(ledger.user_by_telegram_id(43).await.unwrap().is_none());
}

#[tokio::test]
async fn seeded_categories_are_visible_to_every_user() {
    let ledger = ledger_with_db().await;
    let user = ledger.upsert_user(profile(1, "Budi")).await.unwrap();

    let expense = ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await
        .unwrap();
    let income = ledger
        .categories_for_user(user.id, Some(TransactionKind::Income))
        .await
        .unwrap();

    assert_eq!(expense.len(), 8);
    assert_eq!(income.len(), 5);
    // Ordered by name.
    assert_eq!(expense[0].name, "Bills & Utilities");
    assert!(expense.iter().all(|c| c.user_id.is_none()));

    let all = ledger.categories_for_user(user.id, None).await.unwrap();
    assert_eq!(all.len(), 13);
}

#[tokio::test]
async fn own_categories_merge_with_defaults_but_stay_private() {
    let ledger = ledger_with_db().await;
    let owner = ledger.upsert_user(profile(1, "Budi")).await.unwrap();
    let other = ledger.upsert_user(profile(2, "Siti")).await.unwrap();

    let created = ledger
        .create_category(owner.id, "Gasoline", TransactionKind::Expense, "#123456")
        .await
        .unwrap();
    assert_eq!(created.user_id, Some(owner.id));

    let found = ledger.category_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Gasoline");

    let owner_cats = ledger
        .categories_for_user(owner.id, Some(TransactionKind::Expense))
        .await
        .unwrap();
    assert!(owner_cats.iter().any(|c| c.name == "Gasoline"));

    let other_cats = ledger
        .categories_for_user(other.id, Some(TransactionKind::Expense))
        .await
        .unwrap();
    assert!(!other_cats.iter().any(|c| c.name == "Gasoline"));
}

#[tokio::test]
async fn create_transaction_rejects_non_positive_amounts() {
    let ledger = ledger_with_db().await;
    let user = ledger.upsert_user(profile(1, "Budi")).await.unwrap();
    let categories = ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await
        .unwrap();

    let new = NewTransaction {
        user_id: user.id,
        category_id: categories[0].id,
        amount: 0,
        kind: TransactionKind::Expense,
        description: None,
        transaction_date: date(2025, 3, 10),
    };
    assert!(ledger.create_transaction(new).await.is_err());
}

#[tokio::test]
async fn balance_sums_income_and_expense_separately() {
    let ledger = ledger_with_db().await;
    let user = ledger.upsert_user(profile(1, "Budi")).await.unwrap();
    let salary = ledger
        .categories_for_user(user.id, Some(TransactionKind::Income))
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Salary")
        .unwrap();
    let food = ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Food & Dining")
        .unwrap();

    ledger
        .create_transaction(NewTransaction {
            user_id: user.id,
            category_id: salary.id,
            amount: 10_000,
            kind: TransactionKind::Income,
            description: None,
            transaction_date: date(2025, 3, 1),
        })
        .await
        .unwrap();
    ledger
        .create_transaction(NewTransaction {
            user_id: user.id,
            category_id: food.id,
            amount: 2_500,
            kind: TransactionKind::Expense,
            description: Some("lunch".to_string()),
            transaction_date: date(2025, 3, 2),
        })
        .await
        .unwrap();

    let balance = ledger.balance(user.id).await.unwrap();
    assert_eq!(balance.total_income, 10_000);
    assert_eq!(balance.total_expense, 2_500);
    assert_eq!(balance.balance, 7_500);
    assert_eq!(balance.transaction_count, 2);

    // A fresh user starts from zero.
    let other = ledger.upsert_user(profile(2, "Siti")).await.unwrap();
    let empty = ledger.balance(other.id).await.unwrap();
    assert_eq!(empty.balance, 0);
    assert_eq!(empty.transaction_count, 0);
}

#[tokio::test]
async fn recent_transactions_are_newest_first_with_category_names() {
    let ledger = ledger_with_db().await;
    let user = ledger.upsert_user(profile(1, "Budi")).await.unwrap();
    let food = ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Food & Dining")
        .unwrap();

    for (amount, day) in [(1_000, 1), (2_000, 2), (3_000, 3)] {
        ledger
            .create_transaction(NewTransaction {
                user_id: user.id,
                category_id: food.id,
                amount,
                kind: TransactionKind::Expense,
                description: None,
                transaction_date: date(2025, 3, day),
            })
            .await
            .unwrap();
    }

    let entries = ledger.recent_transactions(user.id, 2).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].transaction.amount, 3_000);
    assert_eq!(entries[1].transaction.amount, 2_000);
    assert_eq!(entries[0].category_name.as_deref(), Some("Food & Dining"));
}

#[tokio::test]
async fn monthly_report_groups_by_category_within_the_month() {
    let ledger = ledger_with_db().await;
    let user = ledger.upsert_user(profile(1, "Budi")).await.unwrap();
    let food = ledger
        .categories_for_user(user.id, Some(TransactionKind::Expense))
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Food & Dining")
        .unwrap();
    let salary = ledger
        .categories_for_user(user.id, Some(TransactionKind::Income))
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Salary")
        .unwrap();

    for (amount, day) in [(1_500, 5), (2_500, 20)] {
        ledger
            .create_transaction(NewTransaction {
                user_id: user.id,
                category_id: food.id,
                amount,
                kind: TransactionKind::Expense,
                description: None,
                transaction_date: date(2025, 3, day),
            })
            .await
            .unwrap();
    }
    ledger
        .create_transaction(NewTransaction {
            user_id: user.id,
            category_id: salary.id,
            amount: 50_000,
            kind: TransactionKind::Income,
            description: None,
            transaction_date: date(2025, 3, 25),
        })
        .await
        .unwrap();
    // Outside the reported month.
    ledger
        .create_transaction(NewTransaction {
            user_id: user.id,
            category_id: food.id,
            amount: 9_000,
            kind: TransactionKind::Expense,
            description: None,
            transaction_date: date(2025, 4, 1),
        })
        .await
        .unwrap();

    let report = ledger.monthly_report(user.id, 2025, 3).await.unwrap();
    assert_eq!(report.total_expense, 4_000);
    assert_eq!(report.total_income, 50_000);
    assert_eq!(report.balance, 46_000);
    assert_eq!(report.transaction_count, 3);
    assert_eq!(
        report.expenses_by_category,
        vec![("Food & Dining".to_string(), 4_000)]
    );
    assert_eq!(
        report.income_by_category,
        vec![("Salary".to_string(), 50_000)]
    );
}
