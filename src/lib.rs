pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod recipe;
pub mod reshape;
pub mod validator;

pub use config::Config;
pub use error::{KitchenError, Result};
