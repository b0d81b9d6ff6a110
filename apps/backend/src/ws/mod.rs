pub mod hub;
pub mod notifier;
pub mod protocol;
pub mod session;
