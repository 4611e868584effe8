pub mod mail;
pub mod orchestrator;
