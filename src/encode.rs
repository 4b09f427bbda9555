use rand::Rng;

use crate::error::{AirgapError, Result};
use crate::frame::{Frame, HEADER_SIZE, MAX_CHUNKS, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::{qr, transport};

/// Splits a payload into frames and renders them as QR codes, one at a time.
///
/// The payload and chunk size are fixed at construction; frames are produced
/// on demand and never cached. `generate_qr_string(i)` depends only on
/// (payload, chunk_size, session_id, i), so callers may generate frames in
/// any order, repeatedly.
#[derive(Debug)]
pub struct Encoder {
    data: Vec<u8>,
    chunk_size: usize,
    session_id: u32,
    chunk_count: usize,
}

impl Encoder {
    /// Creates an encoder with a session id drawn from OS entropy.
    /// `chunk_size` is the total frame size, header included.
    pub fn new(data: &[u8], chunk_size: usize) -> Result<Self> {
        Self::with_rng(data, chunk_size, &mut rand::thread_rng())
    }

    /// Like [`Encoder::new`] but with a caller-supplied RNG, so tests can
    /// pin the session id with a seeded generator.
    pub fn with_rng<R: Rng>(data: &[u8], chunk_size: usize, rng: &mut R) -> Result<Self> {
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(AirgapError::ChunkSizeTooSmall);
        }
        if chunk_size > MAX_CHUNK_SIZE {
            return Err(AirgapError::ChunkSizeTooLarge);
        }

        let payload_size = chunk_size - HEADER_SIZE;
        let chunk_count = if data.is_empty() {
            // An empty payload still transfers as one header-only frame
            1
        } else if payload_size == 0 {
            return Err(AirgapError::TooManyChunks);
        } else {
            (data.len() + payload_size - 1) / payload_size
        };

        if chunk_count > MAX_CHUNKS {
            return Err(AirgapError::TooManyChunks);
        }

        Ok(Encoder {
            data: data.to_vec(),
            chunk_size,
            session_id: rng.gen(),
            chunk_count,
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Base45 text of frame `index`, ready to be shown as a QR code.
    pub fn generate_qr_string(&self, index: usize) -> Result<String> {
        if index >= self.chunk_count {
            return Err(AirgapError::ChunkOutOfBounds);
        }

        let payload_size = self.chunk_size - HEADER_SIZE;
        let start = index * payload_size;
        let end = (start + payload_size).min(self.data.len());

        let frame = Frame::new(
            self.session_id,
            index as u16,
            self.chunk_count as u16,
            &self.data[start..end],
        );
        Ok(transport::encode(&frame.to_bytes()))
    }

    /// PNG bytes of frame `index`.
    pub fn generate_png(&self, index: usize) -> Result<Vec<u8>> {
        qr::render_png(&self.generate_qr_string(index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(data: &[u8], chunk_size: usize) -> Encoder {
        Encoder::with_rng(data, chunk_size, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_empty_payload_is_one_chunk() {
        let encoder = seeded(&[], 16);
        assert_eq!(encoder.chunk_count(), 1);

        let bytes = transport::decode(&encoder.generate_qr_string(0).unwrap()).unwrap();
        let frame = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(frame.header.total_chunks, 1);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_chunk_count_exact_multiple() {
        // 32 payload bytes at 16 per frame
        let encoder = seeded(&[0u8; 32], 32);
        assert_eq!(encoder.chunk_count(), 2);
    }

    #[test]
    fn test_chunk_count_with_tail() {
        // 50 payload bytes at 16 per frame: three full frames plus 2 bytes
        let encoder = seeded(&[0u8; 50], 32);
        assert_eq!(encoder.chunk_count(), 4);

        let bytes = transport::decode(&encoder.generate_qr_string(3).unwrap()).unwrap();
        assert_eq!(Frame::from_bytes(&bytes).unwrap().payload.len(), 2);
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert_eq!(
            Encoder::new(b"x", 15).unwrap_err(),
            AirgapError::ChunkSizeTooSmall
        );
        assert_eq!(
            Encoder::new(b"x", MAX_CHUNK_SIZE + 1).unwrap_err(),
            AirgapError::ChunkSizeTooLarge
        );
        assert!(Encoder::new(b"x", MAX_CHUNK_SIZE).is_ok());
    }

    #[test]
    fn test_minimum_chunk_size_rejects_nonempty_payload() {
        // A 16-byte frame has no room for payload bytes
        assert_eq!(
            Encoder::new(b"x", 16).unwrap_err(),
            AirgapError::TooManyChunks
        );
    }

    #[test]
    fn test_too_many_chunks() {
        // One payload byte per frame, one byte past the chunk count limit
        let data = vec![0u8; MAX_CHUNKS + 1];
        assert_eq!(
            Encoder::new(&data, 17).unwrap_err(),
            AirgapError::TooManyChunks
        );
        assert!(Encoder::new(&data[..MAX_CHUNKS], 17).is_ok());
    }

    #[test]
    fn test_out_of_bounds_index() {
        let encoder = seeded(b"hello", 32);
        assert_eq!(encoder.chunk_count(), 1);
        assert_eq!(
            encoder.generate_qr_string(1).unwrap_err(),
            AirgapError::ChunkOutOfBounds
        );
        assert_eq!(
            encoder.generate_png(1).unwrap_err(),
            AirgapError::ChunkOutOfBounds
        );
    }

    #[test]
    fn test_frame_production_is_pure() {
        let encoder = seeded(&[0xA5; 100], 48);
        let first = encoder.generate_qr_string(1).unwrap();
        let again = encoder.generate_qr_string(1).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let a = seeded(b"data", 64);
        let b = seeded(b"data", 64);
        assert_eq!(a.session_id(), b.session_id());
        assert_eq!(
            a.generate_qr_string(0).unwrap(),
            b.generate_qr_string(0).unwrap()
        );
    }

    #[test]
    fn test_generate_png_signature() {
        let encoder = seeded(b"png frame", 64);
        let png = encoder.generate_png(0).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
