mod classify;
mod config;
mod mock;
mod protocol;
mod retry;
