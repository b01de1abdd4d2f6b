//! Authentication HTTP Handlers

pub mod login;
pub mod register;
pub mod types;

pub use login::login;
pub use register::register;
