//! Reusable contract components, mirroring the OpenZeppelin Cairo 0 libraries
//! the Mystis contracts are composed of

pub mod erc721;
pub mod ownable;
pub mod proxy;
