//! Implementations of the scripts

pub mod abi;
pub mod declare;
pub mod deploy;
pub mod upgrade;
pub mod utils;
pub mod verify;
