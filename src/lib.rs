pub mod decode;
pub mod encode;
pub mod error;
pub mod ffi;
pub mod frame;
pub mod qr;
pub mod terminal;
pub mod transport;

pub use decode::Decoder;
pub use encode::Encoder;
pub use error::AirgapError;
pub use frame::{
    Frame, FrameHeader, HEADER_SIZE, MAX_CHUNKS, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, PROTOCOL_VERSION,
    RECOMMENDED_MAX_CHUNK_SIZE,
};
pub use qr::{fits_in_terminal, render_png, render_terminal};
pub use terminal::{display_carousel, display_once};
