pub use super::article::Entity as Article;
pub use super::chat_message::Entity as ChatMessage;
pub use super::menu::Entity as Menu;
pub use super::role::Entity as Role;
pub use super::role_menu::Entity as RoleMenu;
pub use super::user::Entity as User;
pub use super::user_role::Entity as UserRole;
