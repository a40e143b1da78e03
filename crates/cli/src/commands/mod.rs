pub mod mail;
pub mod migrate;
