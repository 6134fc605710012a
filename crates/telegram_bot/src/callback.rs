//! Callback payloads.
//!
//! Inline keyboard buttons carry opaque strings. They are parsed into a
//! closed intent type once, at the transport boundary, so the dispatcher
//! matches exhaustively instead of scattering string prefixes around.

use ledger::TransactionKind;

/// Buttons that simply re-run a stateless command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickAction {
    Expense,
    Income,
    Balance,
    List,
    Help,
    Categories,
    Report,
}

/// Everything a button press can mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackIntent {
    /// A category was picked for a new expense.
    ExpenseCategory(i64),
    /// A category was picked for new income.
    IncomeCategory(i64),
    /// "Add New Category" was pressed.
    AddNewCategory,
    /// A type was picked for the category being created.
    AddCategoryKind(TransactionKind),
    Quick(QuickAction),
}

impl CallbackIntent {
    /// Parses an opaque payload string. Unknown payloads yield `None` and
    /// are dropped after acknowledgement.
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix("expense_category_") {
            return id.parse().ok().map(Self::ExpenseCategory);
        }
        if let Some(id) = data.strip_prefix("income_category_") {
            return id.parse().ok().map(Self::IncomeCategory);
        }

        match data {
            "add_new_category" => Some(Self::AddNewCategory),
            "add_category_expense" => Some(Self::AddCategoryKind(TransactionKind::Expense)),
            "add_category_income" => Some(Self::AddCategoryKind(TransactionKind::Income)),
            "quick_expense" => Some(Self::Quick(QuickAction::Expense)),
            "quick_income" => Some(Self::Quick(QuickAction::Income)),
            "quick_balance" => Some(Self::Quick(QuickAction::Balance)),
            "quick_list" => Some(Self::Quick(QuickAction::List)),
            "quick_help" => Some(Self::Quick(QuickAction::Help)),
            "quick_categories" => Some(Self::Quick(QuickAction::Categories)),
            "quick_report" => Some(Self::Quick(QuickAction::Report)),
            _ => None,
        }
    }
}
