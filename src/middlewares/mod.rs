pub mod rate_limit;
pub mod require_login;
pub mod require_role;
pub mod session;

pub use rate_limit::RateLimit;
pub use require_login::RequireLogin;
pub use require_role::RequireRole;
pub use session::{Session, SessionMiddleware};
