pub mod account;
pub mod connection_status;
pub mod layout;
pub mod mint;
pub mod stake;
