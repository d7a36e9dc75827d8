pub mod progress_service;

pub use progress_service::{CustomerOverview, ProgressService};
