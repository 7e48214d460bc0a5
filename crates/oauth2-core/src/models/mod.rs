pub mod error;
pub mod github;
pub mod scope;
pub mod token;

pub use error::*;
pub use github::*;
pub use scope::*;
pub use token::*;
