pub mod pairing;
pub mod report;
