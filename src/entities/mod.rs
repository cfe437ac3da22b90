pub mod prelude;

pub mod login_attempts;
pub mod users;
pub mod website_content;
