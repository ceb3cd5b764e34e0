pub mod backup;
pub mod dashboard;
pub mod health;
pub mod routine;
pub mod sessions;
pub mod settings;
