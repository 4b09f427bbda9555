use std::collections::HashMap;

use crate::error::{AirgapError, Result};
use crate::frame::Frame;
use crate::transport;

/// Collects scanned frames for a single session and reassembles the payload.
///
/// The decoder moves through three states: empty until the first valid frame
/// is accepted, receiving while chunks are outstanding, and complete once
/// every index in `0..total_chunks` has arrived. The first valid frame pins
/// the session id and total chunk count; there is no way back to the empty
/// state, so a new transfer needs a new decoder.
///
/// Frames may arrive in any order and any number of times. A failed
/// `process_qr` call leaves the decoder exactly as it was.
pub struct Decoder {
    session_id: Option<u32>,
    total_chunks: Option<u16>,
    chunks: HashMap<u16, Vec<u8>>,
    complete: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            session_id: None,
            total_chunks: None,
            chunks: HashMap::new(),
            complete: false,
        }
    }

    /// Processes one scanned QR string. Returns the frame's chunk index and
    /// the session's total chunk count; duplicates and frames arriving after
    /// completion succeed without changing anything.
    pub fn process_qr(&mut self, text: &str) -> Result<(u16, u16)> {
        let bytes = transport::decode(text)?;
        let frame = Frame::from_bytes(&bytes)?;

        let header = frame.header;
        match self.session_id {
            None => {
                // First valid frame defines the session
                self.session_id = Some(header.session_id);
                self.total_chunks = Some(header.total_chunks);
            }
            Some(session_id) => {
                if header.session_id != session_id {
                    return Err(AirgapError::SessionMismatch);
                }
                if Some(header.total_chunks) != self.total_chunks {
                    return Err(AirgapError::MetadataMismatch);
                }
            }
        }

        if self.complete {
            return Ok((header.chunk_index, header.total_chunks));
        }

        if !self.chunks.contains_key(&header.chunk_index) {
            self.chunks.insert(header.chunk_index, frame.payload.to_vec());
            if self.chunks.len() == header.total_chunks as usize {
                self.complete = true;
            }
        }

        Ok((header.chunk_index, header.total_chunks))
    }

    /// Total chunks expected, or 0 before the first accepted frame.
    pub fn total_chunks(&self) -> usize {
        self.total_chunks.map_or(0, usize::from)
    }

    /// Unique chunks received so far.
    pub fn received_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Reassembles the payload once every chunk has arrived.
    ///
    /// All chunks but the last must share one length and the last must fit
    /// within it; a session violating that was stitched together from frames
    /// that never came from a single encoder.
    pub fn data(&self) -> Result<Vec<u8>> {
        if !self.complete {
            return Err(AirgapError::MissingChunk);
        }
        let total = self.total_chunks.ok_or(AirgapError::MissingChunk)?;

        let chunk_at = |index: u16| self.chunks.get(&index).ok_or(AirgapError::MissingChunk);

        if total > 1 {
            let stride = chunk_at(0)?.len();
            for index in 1..total - 1 {
                if chunk_at(index)?.len() != stride {
                    return Err(AirgapError::MetadataMismatch);
                }
            }
            let tail = chunk_at(total - 1)?.len();
            if tail == 0 || tail > stride {
                return Err(AirgapError::MetadataMismatch);
            }
        }

        let mut data = Vec::new();
        for index in 0..total {
            data.extend_from_slice(chunk_at(index)?);
        }
        Ok(data)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
