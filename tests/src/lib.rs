pub mod proxy;
pub mod utils;
