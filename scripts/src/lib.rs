//! Scripts for declaring, deploying, upgrading & verifying the Mystis NFT proxy

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod commands;
pub mod config;
