pub mod request_decoder;

pub use request_decoder::{MAX_MESSAGE_SIZE, SHUTDOWN_SENTINEL, decode_request, is_shutdown};
