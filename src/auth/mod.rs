pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod route_permissions;
pub mod types;

pub use jwt::*;
pub use middleware::*;
pub use permissions::*;
pub use route_permissions::*;
pub use types::*;
