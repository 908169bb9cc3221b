pub mod error;
pub use error::*;

pub mod console;
pub mod editor;
pub mod gateway;
pub mod model;
pub mod outcome;
pub mod statsview;
pub mod store;
pub mod types;

mod wrapper;
