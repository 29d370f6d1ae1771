pub mod book;
pub mod bookmark;
pub mod commands;
pub mod errors;
pub mod exchange;
pub mod order;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
