/// Class Portal Server library
/// Remote table backend used as the sync target of the class portal client

pub mod config;
pub mod db;
pub mod handlers;
pub mod server;
