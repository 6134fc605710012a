//! Message and keyboard rendering.

use chrono::NaiveDate;
use ledger::{Balance, Category, MonthlyReport, TransactionEntry, TransactionKind};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::{parsing::format_rupiah, state::AmountDraft};

pub(crate) const CANCELLED: &str = "❌ Operation cancelled.";
pub(crate) const GENERIC_ERROR: &str = "❌ Sorry, something went wrong. Please try again.";
pub(crate) const USER_NOT_FOUND: &str =
    "❌ User not found. Please use /start to initialize your account.";
pub(crate) const INVALID_AMOUNT: &str =
    "❌ Please enter a valid positive number for the amount. (Example: 10.000)";
pub(crate) const CATEGORY_NAME_REQUIRED: &str =
    "❌ A category name is required to continue. (Alphabet only)";
pub(crate) const INVALID_CATEGORY_NAME: &str =
    "❌ Please enter a valid category name. (Alphabet only)";

fn kind_emoji(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "💸",
        TransactionKind::Income => "💰",
    }
}

fn kind_noun(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "expense",
        TransactionKind::Income => "income",
    }
}

fn kind_title(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    }
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub(crate) fn no_categories(kind: TransactionKind) -> String {
    format!(
        "❌ No {} categories found. Please contact support.",
        kind_noun(kind)
    )
}

pub(crate) fn render_welcome(first_name: Option<&str>) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "🎉 *Welcome to Expense Tracker Bot!*\n\n\
         Hello {}! I'm here to help you track your expenses and income easily.\n\n\
         💰 *What I can do for you:*\n\
         • Track your daily expenses and income\n\
         • Categorize your transactions\n\
         • Show your current balance\n\
         • Generate monthly reports\n\
         • Manage your spending categories\n\n\
         🚀 *Quick Start:*\n\
         • Use /expense to add a new expense\n\
         • Use /income to add new income\n\
         • Use /balance to see your current balance\n\
         • Use /list to see your recent transactions\n\
         • Use /categories to view all available categories\n\
         • Use /report to generate a monthly financial report\n\
         • Use /help for all available commands\n\n\
         Let's start managing your finances! 💪",
        first_name.unwrap_or("there")
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![
            InlineKeyboardButton::callback("📊 View Balance", "quick_balance"),
            InlineKeyboardButton::callback("❓ Help", "quick_help"),
        ],
    ]);

    (text, kb)
}

pub(crate) fn render_help() -> (String, InlineKeyboardMarkup) {
    let text = "📚 *Expense Tracker Bot - Help Guide*\n\n\
         *Basic Commands:*\n\
         🏠 /start - Initialize the bot and create your account\n\
         ❓ /help - Show this help message\n\
         ❌ /cancel - Cancel current operation\n\n\
         *Financial Tracking:*\n\
         💸 /expense - Add a new expense\n\
         💰 /income - Add new income\n\
         📊 /balance - View your current balance\n\
         📝 /list - View recent transactions\n\
         🏷️ /categories - View all available categories\n\
         📈 /report - Generate monthly financial report\n\n\
         *Adding Expenses or Income:*\n\
         1. Type /expense or /income\n\
         2. Select a category from the menu\n\
         3. Enter the amount (e.g., 10.000/10000)\n\
         4. Add a description, or type \"skip\"\n\n\
         *Tips:*\n\
         • Use clear descriptions for better tracking\n\
         • Check your balance regularly\n\
         • Review monthly reports to understand spending patterns\n\n\
         *Need Help?*\n\
         If you encounter any issues, try /cancel to reset and start over.\n\n\
         Happy tracking! 💪💰"
        .to_string();

    let kb = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![
            InlineKeyboardButton::callback("📊 View Balance", "quick_balance"),
            InlineKeyboardButton::callback("📝 View Transactions", "quick_list"),
        ],
        vec![
            InlineKeyboardButton::callback("🏷️ Categories", "quick_categories"),
            InlineKeyboardButton::callback("📈 Monthly Report", "quick_report"),
        ],
    ]);

    (text, kb)
}

/// Category picker shown when an expense/income dialogue starts.
///
/// Categories come in rows of two; the payload carries the category id.
pub(crate) fn render_category_picker(
    kind: TransactionKind,
    categories: &[Category],
) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "{} *Adding New {}*\n\n\
         Please select a category for your {}:\n\n\
         Use /cancel to stop this operation.",
        kind_emoji(kind),
        kind_title(kind),
        kind_noun(kind)
    );

    let payload_prefix = match kind {
        TransactionKind::Expense => "expense_category_",
        TransactionKind::Income => "income_category_",
    };

    let rows = categories
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|category| {
                    InlineKeyboardButton::callback(
                        category.name.clone(),
                        format!("{payload_prefix}{}", category.id),
                    )
                })
                .collect()
        })
        .collect::<Vec<Vec<_>>>();

    (text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_amount_prompt(kind: TransactionKind, category_name: &str) -> String {
    format!(
        "{} *Adding {} - {}*\n\n\
         Please enter the amount for this {}:\n\
         (Example: 10.000 / 10000)\n\n\
         Use /cancel to stop this operation.",
        kind_emoji(kind),
        kind_title(kind),
        category_name,
        kind_noun(kind)
    )
}

pub(crate) fn render_description_prompt(kind: TransactionKind, draft: &AmountDraft) -> String {
    format!(
        "{} *Adding {} - {}*\n\
         Amount: {}\n\n\
         Please enter a description for this {} (optional):\n\
         You can also type \"skip\" to add without description.\n\n\
         Use /cancel to stop this operation.",
        kind_emoji(kind),
        kind_title(kind),
        draft.category_name,
        draft.formatted_amount,
        kind_noun(kind)
    )
}

pub(crate) fn render_transaction_saved(
    kind: TransactionKind,
    draft: &AmountDraft,
    description: Option<&str>,
    date: NaiveDate,
) -> (String, InlineKeyboardMarkup) {
    let description_line = description
        .map(|text| format!("\n📝 *Description:* {text}"))
        .unwrap_or_default();

    let text = format!(
        "✅ *{} Added Successfully!*\n\n\
         {} *Category:* {}\n\
         💵 *Amount:* {}\n\
         📅 *Date:* {}{}\n\n\
         Your {} has been recorded!",
        kind_title(kind),
        kind_emoji(kind),
        draft.category_name,
        draft.formatted_amount,
        long_date(date),
        description_line,
        kind_noun(kind)
    );

    let first_row = match kind {
        TransactionKind::Expense => vec![
            InlineKeyboardButton::callback("💸 Add Another Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        TransactionKind::Income => vec![
            InlineKeyboardButton::callback("💰 Add Another Income", "quick_income"),
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
        ],
    };
    let kb = InlineKeyboardMarkup::new(vec![
        first_row,
        vec![InlineKeyboardButton::callback(
            "📊 View Balance",
            "quick_balance",
        )],
    ]);

    (text, kb)
}

pub(crate) fn render_category_type_picker() -> (String, InlineKeyboardMarkup) {
    let text = "💰 *Adding New Category*\n\n\
         Please select a category type:\n\n\
         Use /cancel to stop this operation."
        .to_string();

    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("💸 Expense", "add_category_expense"),
        InlineKeyboardButton::callback("💰 Income", "add_category_income"),
    ]]);

    (text, kb)
}

pub(crate) fn render_category_name_prompt(kind: TransactionKind) -> String {
    format!(
        "💰 *Adding new {} category*\n\n\
         Please write a name for the new {} category:\n\
         (Example: Gasoline)\n\n\
         Use /cancel to stop this operation.",
        kind_noun(kind),
        kind_noun(kind)
    )
}

pub(crate) fn render_category_saved(
    name: &str,
    date: NaiveDate,
) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "✅ *New Category Added Successfully!*\n\n\
         💰 *Category:* {}\n\
         📅 *Date:* {}",
        name,
        long_date(date)
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💰 Add Another Category",
            "add_new_category",
        )],
        vec![
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
        ],
        vec![InlineKeyboardButton::callback(
            "📊 View Balance",
            "quick_balance",
        )],
    ]);

    (text, kb)
}

pub(crate) fn render_balance(balance: &Balance, today: NaiveDate) -> (String, InlineKeyboardMarkup) {
    let (status_emoji, status_text, status_message) = if balance.balance > 0 {
        ("✅", "Positive", "Great job! You are saving money.")
    } else if balance.balance < 0 {
        ("⚠️", "Negative", "Consider reviewing your expenses.")
    } else {
        ("📊", "Neutral", "You are breaking even.")
    };

    let text = format!(
        "{status_emoji} *Your Financial Summary*\n\n\
         💰 *Current Balance:* {}\n\
         Status: {status_emoji} {status_text}\n\n\
         💰 *Total Income:* {}\n\
         💸 *Total Expenses:* {}\n\n\
         📅 *As of:* {}\n\n\
         {status_message}",
        format_rupiah(balance.balance),
        format_rupiah(balance.total_income),
        format_rupiah(balance.total_expense),
        long_date(today)
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![InlineKeyboardButton::callback(
            "📝 View Transactions",
            "quick_list",
        )],
    ]);

    (text, kb)
}

pub(crate) fn render_list(entries: &[TransactionEntry]) -> (String, InlineKeyboardMarkup) {
    if entries.is_empty() {
        let text = "📝 *No Transactions Found*\n\n\
             You haven't recorded any transactions yet.\n\n\
             🚀 *Get started:*\n\
             • Use /expense to add your first expense\n\
             • Use /income to add your first income\n\n\
             Start tracking your finances today! 💪"
            .to_string();
        let kb = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ]]);
        return (text, kb);
    }

    let mut lines = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        let tx = &entry.transaction;
        let (emoji, sign) = match tx.kind {
            TransactionKind::Income => ("💰", "+"),
            TransactionKind::Expense => ("💸", "-"),
        };
        let category = entry.category_name.as_deref().unwrap_or("No Category");
        let description = tx
            .description
            .as_deref()
            .map(|text| format!(" - {text}"))
            .unwrap_or_default();

        lines.push(format!(
            "{emoji} *{sign}{}* | {category}",
            format_rupiah(tx.amount)
        ));
        lines.push(format!(
            "📅 {}{description}",
            tx.transaction_date.format("%b %d")
        ));
    }

    let text = format!(
        "📝 *Recent Transactions* (Last {})\n\n\
         {}\n\n\
         Use /balance to see your current financial summary.",
        entries.len(),
        lines.join("\n")
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![InlineKeyboardButton::callback(
            "📊 View Balance",
            "quick_balance",
        )],
    ]);

    (text, kb)
}

pub(crate) fn render_categories(
    expense: &[Category],
    income: &[Category],
) -> (String, InlineKeyboardMarkup) {
    let numbered = |categories: &[Category]| {
        if categories.is_empty() {
            return "• None yet".to_string();
        }
        categories
            .iter()
            .enumerate()
            .map(|(index, category)| format!("{}. {}", index + 1, category.name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let text = format!(
        "🏷️ *Your Categories*\n\n\
         *💸 Expense Categories ({}):*\n{}\n\n\
         *💰 Income Categories ({}):*\n{}\n\n\
         These categories help organize your transactions for better tracking and reporting.",
        expense.len(),
        numbered(expense),
        income.len(),
        numbered(income)
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "Add New Category",
            "add_new_category",
        )],
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![
            InlineKeyboardButton::callback("📊 View Balance", "quick_balance"),
            InlineKeyboardButton::callback("📝 View Transactions", "quick_list"),
        ],
    ]);

    (text, kb)
}

pub(crate) fn render_report(report: &MonthlyReport) -> (String, InlineKeyboardMarkup) {
    let first_day = NaiveDate::from_ymd_opt(report.year, report.month, 1).unwrap_or_default();
    let last_day = if report.month == 12 {
        NaiveDate::from_ymd_opt(report.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(report.year, report.month + 1, 1)
    }
    .and_then(|first_of_next| first_of_next.pred_opt())
    .unwrap_or(first_day);

    let by_category = |breakdown: &[(String, i64)], empty: &str| {
        if breakdown.is_empty() {
            return format!("• {empty}");
        }
        breakdown
            .iter()
            .map(|(name, amount)| format!("• {name}: {}", format_rupiah(*amount)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let status_message = if report.balance > 0 {
        "🎉 *Great!* You saved money this month."
    } else if report.balance < 0 {
        "⚠️ *Attention:* You spent more than you earned this month."
    } else {
        "📊 You broke even this month."
    };

    let text = format!(
        "📈 *Monthly Report - {}*\n\n\
         💰 *Total Income:* {}\n\
         💸 *Total Expenses:* {}\n\
         {} *Monthly Balance:* {}\n\n\
         💵 *Income by Category:*\n{}\n\n\
         📊 *Expenses by Category:*\n{}\n\n\
         📅 *Period:* {} - {}\n\
         📝 *Total Transactions:* {}\n\n\
         {status_message}",
        first_day.format("%B %Y"),
        format_rupiah(report.total_income),
        format_rupiah(report.total_expense),
        if report.balance >= 0 { "✅" } else { "❌" },
        format_rupiah(report.balance),
        by_category(&report.income_by_category, "No income recorded"),
        by_category(&report.expenses_by_category, "No expenses recorded"),
        first_day.format("%b %d"),
        last_day.format("%b %d, %Y"),
        report.transaction_count
    );

    let kb = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("💸 Add Expense", "quick_expense"),
            InlineKeyboardButton::callback("💰 Add Income", "quick_income"),
        ],
        vec![
            InlineKeyboardButton::callback("📊 View Balance", "quick_balance"),
            InlineKeyboardButton::callback("📝 View Transactions", "quick_list"),
        ],
    ]);

    (text, kb)
}
