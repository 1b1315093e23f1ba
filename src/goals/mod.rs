pub mod dialogue;
pub mod service;
pub mod sessions;
