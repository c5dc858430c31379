pub mod aggregate;
pub mod discover;
pub mod exchange;
pub mod invoker;
pub mod locator;
pub mod pairing;
