// Persistent stores. Each store borrows the connection handle it operates
// on; nothing here owns global state.

pub mod category;
pub mod expense;

pub use category::{Category, CategoryStore};
pub use expense::{CategoryTotal, Expense, ExpenseRow, ExpenseStore, ExpenseUpdate, NewExpense};
