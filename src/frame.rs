use crc::{Crc, CRC_16_IBM_3740};

use crate::error::{AirgapError, Result};

// Frame layout, big-endian:
//   magic "AIR\0" (4) | version (1) | reserved (1) | session_id (4)
//   | chunk_index (2) | total_chunks (2) | crc16 (2) | payload (..)
//
// chunk_size throughout the crate means the total frame size, header
// included, so the payload per frame is chunk_size - HEADER_SIZE.
pub const MAGIC: [u8; 4] = *b"AIR\0";
pub const PROTOCOL_VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 16;
pub const MIN_CHUNK_SIZE: usize = 16;
pub const MAX_CHUNK_SIZE: usize = 1920;
// Frames near MAX_CHUNK_SIZE encode but push QR density past what phone
// cameras scan reliably; senders should stay at or below this.
pub const RECOMMENDED_MAX_CHUNK_SIZE: usize = 1100;
pub const MAX_CHUNKS: usize = u16::MAX as usize;

const CRC_OFFSET: usize = 14;

// CRC-16/CCITT: poly 0x1021, init 0xFFFF, no reflection, no final XOR.
// The crc crate catalogues this parameter set as CRC_16_IBM_3740.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub session_id: u32,
    pub chunk_index: u16,
    pub total_chunks: u16,
}

/// One self-describing transfer unit: header plus a payload borrowed from
/// the buffer it was parsed from (or sliced from the sender's data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
}

/// CRC over the whole frame with the crc16 slot treated as zero.
fn frame_crc(bytes: &[u8]) -> u16 {
    let mut digest = CRC16.digest();
    digest.update(&bytes[..CRC_OFFSET]);
    digest.update(&[0, 0]);
    digest.update(&bytes[HEADER_SIZE..]);
    digest.finalize()
}

impl<'a> Frame<'a> {
    pub fn new(session_id: u32, chunk_index: u16, total_chunks: u16, payload: &'a [u8]) -> Self {
        Frame {
            header: FrameHeader {
                session_id,
                chunk_index,
                total_chunks,
            },
            payload,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE + self.payload.len()];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4] = PROTOCOL_VERSION;
        // bytes[5] is reserved and stays zero
        bytes[6..10].copy_from_slice(&self.header.session_id.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.header.chunk_index.to_be_bytes());
        bytes[12..14].copy_from_slice(&self.header.total_chunks.to_be_bytes());
        bytes[HEADER_SIZE..].copy_from_slice(self.payload);

        let crc = frame_crc(&bytes);
        bytes[CRC_OFFSET..HEADER_SIZE].copy_from_slice(&crc.to_be_bytes());
        bytes
    }

    /// Parses and validates a raw frame. The checks run in a fixed order so
    /// a malformed frame always reports its outermost defect: length, magic,
    /// version, size bounds, CRC, then index bounds.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Frame<'a>> {
        if bytes.len() < HEADER_SIZE {
            return Err(AirgapError::Encoding);
        }
        if bytes[0..4] != MAGIC {
            return Err(AirgapError::InvalidMagic);
        }
        if bytes[4] != PROTOCOL_VERSION {
            return Err(AirgapError::UnsupportedVersion(bytes[4]));
        }
        if bytes.len() > MAX_CHUNK_SIZE {
            return Err(AirgapError::ChunkSizeTooLarge);
        }
        if bytes.len() < MIN_CHUNK_SIZE {
            return Err(AirgapError::ChunkSizeTooSmall);
        }

        let stored_crc = u16::from_be_bytes([bytes[CRC_OFFSET], bytes[CRC_OFFSET + 1]]);
        if frame_crc(bytes) != stored_crc {
            return Err(AirgapError::CrcMismatch);
        }

        let session_id = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let chunk_index = u16::from_be_bytes([bytes[10], bytes[11]]);
        let total_chunks = u16::from_be_bytes([bytes[12], bytes[13]]);

        if total_chunks == 0 || chunk_index >= total_chunks {
            return Err(AirgapError::ChunkOutOfBounds);
        }

        Ok(Frame {
            header: FrameHeader {
                session_id,
                chunk_index,
                total_chunks,
            },
            payload: &bytes[HEADER_SIZE..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_known_value() {
        // Standard check value for CRC-16/CCITT with 0xFFFF init
        assert_eq!(CRC16.checksum(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_frame_roundtrip() {
        let payload = b"frame payload bytes";
        let bytes = Frame::new(0xDEADBEEF, 3, 7, payload).to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + payload.len());

        let frame = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(frame.header.session_id, 0xDEADBEEF);
        assert_eq!(frame.header.chunk_index, 3);
        assert_eq!(frame.header.total_chunks, 7);
        assert_eq!(frame.payload, payload);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let bytes = Frame::new(1, 0, 1, &[]).to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let frame = Frame::from_bytes(&bytes).unwrap();
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_header_layout() {
        let bytes = Frame::new(0x01020304, 0x0506, 0x0708, b"x").to_bytes();
        assert_eq!(&bytes[0..4], b"AIR\0");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 0);
        assert_eq!(&bytes[6..10], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[10..12], &[0x05, 0x06]);
        assert_eq!(&bytes[12..14], &[0x07, 0x08]);
        assert_eq!(bytes[16], b'x');
    }

    #[test]
    fn test_too_short_is_encoding_error() {
        assert_eq!(
            Frame::from_bytes(&[0u8; 15]).unwrap_err(),
            AirgapError::Encoding
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = Frame::new(1, 0, 1, b"abc").to_bytes();
        bytes[0] = b'B';
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::InvalidMagic
        );
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = Frame::new(1, 0, 1, b"abc").to_bytes();
        bytes[4] = 2;
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::UnsupportedVersion(2)
        );
    }

    #[test]
    fn test_version_checked_before_crc() {
        // A corrupt frame with a bad version reports the version, not the CRC
        let mut bytes = Frame::new(1, 0, 1, b"abc").to_bytes();
        bytes[4] = 9;
        bytes[HEADER_SIZE] ^= 0xFF;
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::UnsupportedVersion(9)
        );
    }

    #[test]
    fn test_oversized_frame() {
        let payload = vec![0u8; MAX_CHUNK_SIZE - HEADER_SIZE + 1];
        let bytes = Frame::new(1, 0, 1, &payload).to_bytes();
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::ChunkSizeTooLarge
        );
    }

    #[test]
    fn test_max_sized_frame_parses() {
        let payload = vec![0xAB; MAX_CHUNK_SIZE - HEADER_SIZE];
        let bytes = Frame::new(1, 0, 1, &payload).to_bytes();
        let frame = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(frame.payload.len(), MAX_CHUNK_SIZE - HEADER_SIZE);
    }

    #[test]
    fn test_single_bit_flip_fails_crc() {
        let bytes = Frame::new(0x1234, 2, 5, b"payload under test").to_bytes();
        for bit in 0..bytes.len() * 8 {
            // Magic and version flips are caught by their own checks before
            // the CRC runs; every other byte must be covered by the CRC
            let byte = bit / 8;
            if byte < 5 {
                continue;
            }
            let mut corrupted = bytes.clone();
            corrupted[byte] ^= 1 << (bit % 8);
            assert_eq!(
                Frame::from_bytes(&corrupted).unwrap_err(),
                AirgapError::CrcMismatch,
                "bit {} should have been caught by the CRC",
                bit
            );
        }
    }

    #[test]
    fn test_index_out_of_bounds() {
        let bytes = Frame::new(1, 5, 5, b"abc").to_bytes();
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::ChunkOutOfBounds
        );
    }

    #[test]
    fn test_zero_total_chunks() {
        let bytes = Frame::new(1, 0, 0, b"abc").to_bytes();
        assert_eq!(
            Frame::from_bytes(&bytes).unwrap_err(),
            AirgapError::ChunkOutOfBounds
        );
    }

    #[test]
    fn test_reserved_byte_ignored_on_receive() {
        let mut bytes = Frame::new(1, 0, 1, b"abc").to_bytes();
        bytes[5] = 0x7F;
        let crc = frame_crc(&bytes);
        bytes[CRC_OFFSET..HEADER_SIZE].copy_from_slice(&crc.to_be_bytes());
        assert!(Frame::from_bytes(&bytes).is_ok());
    }
}
