pub mod request;
pub mod result;
pub mod tokenization;

pub use request::*;
pub use result::*;
pub use tokenization::*;
