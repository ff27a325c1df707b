pub mod response;
pub mod route_gate;
pub mod session;

pub use response::{ApiResponse, ApiResult};
pub use route_gate::route_gate;
pub use session::{resolve_session, CurrentSession, SessionContext};
