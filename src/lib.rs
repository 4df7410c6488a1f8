pub mod character;
pub mod config;
pub mod database;
pub mod error;
pub mod identity;
pub mod logging;
pub mod network;
pub mod routing;

pub use character::*;
pub use database::*;
pub use error::*;
pub use identity::*;
pub use routing::*;
