/// Push channel: session actors, the server actor that routes frames to users,
/// and the `EventPublisher` services use to reach them.
pub mod events;
pub mod handler;
pub mod message;
pub mod publisher;
pub mod server;
pub mod session;
