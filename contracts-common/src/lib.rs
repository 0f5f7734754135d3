//! Common modules used throughout the project, including the contract models,
//! scripts & testing code

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abi;
pub mod calldata;
pub mod constants;
pub mod encoding;
pub mod errors;
pub mod types;
