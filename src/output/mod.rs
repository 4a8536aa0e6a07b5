//! Terminal output: box tables, CSV/JSON bill lists, formatted amounts.

pub mod amount;
pub mod bills;
pub mod table;

pub use amount::{AmountFormatter, DEFAULT_LOCALE};
pub use bills::{resolve_rows, sort_and_limit, write_bills, OutputFormat};
pub use table::Table;
