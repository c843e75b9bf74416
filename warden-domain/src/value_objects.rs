// Domain value objects
pub mod identifiers;
pub mod scope;
pub mod severity;

pub use identifiers::*;
pub use scope::*;
pub use severity::*;
