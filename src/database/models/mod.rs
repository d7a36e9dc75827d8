pub mod customer;
pub mod progress;

pub use customer::{Customer, CustomerFilter, CustomerStats, NewCustomer};
pub use progress::ProgressRow;
