// handlers/public/mod.rs - Public handlers (no session required)
//
// Route Prefix: /api/auth/*
// Input is untrusted; every handler validates its own payload.
pub mod auth;
