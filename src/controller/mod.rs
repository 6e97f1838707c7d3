pub mod catalog;
pub mod dashboard;

pub use catalog::CatalogController;
pub use dashboard::{DashboardController, LoadOutcome};
