pub mod asset;
pub mod config;
pub mod error;
pub mod file;
pub mod metadata;
pub mod traits;

pub mod prelude {
    pub use super::asset::*;
    pub use super::config::*;
    pub use super::error::*;
    pub use super::file::*;
    pub use super::metadata::*;
    pub use super::traits::*;
}
