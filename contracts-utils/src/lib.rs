//! Common utilities used outside of the contracts themselves, e.g. for deploy scripts & testing:
//! the network client abstraction, its JSON-RPC & devnet backends, and test assertions

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod assertions;
pub mod client;
pub mod contract;
pub mod devnet;
pub mod errors;
pub mod rpc;
pub mod signer;
