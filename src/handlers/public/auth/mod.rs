// handlers/public/auth/mod.rs - Public authentication handlers

pub mod register; // POST /api/auth/register - create account + default workspace
pub mod session;  // POST /api/auth/login, POST /api/auth/logout, GET /api/auth/session

pub use register::register;
pub use session::{current_session, login, logout};
