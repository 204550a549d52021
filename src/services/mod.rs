pub mod health;
pub mod keyboard;
pub mod scheduler;
