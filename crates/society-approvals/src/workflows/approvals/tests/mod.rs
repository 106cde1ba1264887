mod common;
mod pending;
