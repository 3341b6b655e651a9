//! IPC module: the request/response face of the engine

mod protocol;
mod server;

pub use protocol::{read_frame, write_message, DaemonStatus, Request, Response, MAX_MESSAGE_LEN};
pub use server::Server;
