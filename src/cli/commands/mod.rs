pub mod migrate;
pub mod route;
pub mod serve;
