//! Core smart contract functionality: native models of the Mystis contracts
//! and the environment they execute in

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod contracts;
pub mod errors;
pub mod execution;
pub mod state;
pub mod storage;
