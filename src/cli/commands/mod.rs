pub mod customer;
pub mod progress;
pub mod rounds;
pub mod server;
