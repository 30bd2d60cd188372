pub mod escaping;
pub mod scanning;
