pub mod request_log;
pub mod session;

pub use request_log::{RequestId, RequestLogger};
pub use session::{Session, SessionMiddleware};
