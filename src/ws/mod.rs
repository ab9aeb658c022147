pub mod dispatcher;
pub mod handler;
pub mod relay;
pub mod session;

pub use dispatcher::DispatcherHandle;
pub use handler::websocket_handler;
