pub mod auth;
pub mod authz;
pub mod server;
