pub mod repository;
pub mod issue;

pub use repository::*;
pub use issue::*;
