pub mod session;

pub use session::logout as session_logout;
pub use session::whoami as session_whoami;
