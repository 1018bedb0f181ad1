#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod routes;
pub mod scanned_cases;
pub mod server;
pub mod stores;
pub mod utils;
