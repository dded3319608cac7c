mod common;
mod expiration_and_cache;
