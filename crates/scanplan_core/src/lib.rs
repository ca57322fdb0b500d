pub mod arrays;
pub mod config;
pub mod database;
pub mod explain;
pub mod functions;
pub mod logical;
pub mod persist;
pub mod proto;
pub mod statistics;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;
