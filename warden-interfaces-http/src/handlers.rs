pub mod activity_handlers;
pub mod event_handlers;
pub mod ops_handlers;
pub mod rule_handlers;
pub mod score_handlers;
pub mod violation_handlers;

pub use activity_handlers::*;
pub use event_handlers::*;
pub use ops_handlers::*;
pub use rule_handlers::*;
pub use score_handlers::*;
pub use violation_handlers::*;
