pub mod alert_service;
pub mod event_poller;

pub use alert_service::*;
pub use event_poller::*;
