pub use super::login_attempts::Entity as LoginAttempts;
pub use super::users::Entity as Users;
pub use super::website_content::Entity as WebsiteContent;
