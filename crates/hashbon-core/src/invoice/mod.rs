//! Milestone invoice extraction module.

pub mod aggregate;
pub mod classifier;
pub mod mapper;
mod parser;
pub mod rules;

pub use aggregate::{compute_totals, compute_totals_with};
pub use classifier::{find_milestone_table, is_milestone_table, TableClassifier};
pub use mapper::RowMapper;
pub use parser::{InvoiceParser, MilestoneParser};
