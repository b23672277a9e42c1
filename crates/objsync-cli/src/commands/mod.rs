pub mod cat;
pub mod common;
pub mod config;
pub mod cp;
pub mod mirror;

pub use cat::Cat;
pub use common::CommandOptions;
pub use config::Config;
pub use cp::Cp;
pub use mirror::Mirror;
