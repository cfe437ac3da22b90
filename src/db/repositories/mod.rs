pub mod content;
pub mod login_attempt;
pub mod user;
