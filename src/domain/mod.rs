pub mod course;
pub mod order;
pub mod ports;
pub mod progress;
pub mod user;
