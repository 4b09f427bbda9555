//! C ABI for the encoder and decoder.
//!
//! Handles are opaque pointers with paired free functions; buffers cross the
//! boundary as a (pointer, length) pair whose ownership transfers to the
//! caller and must come back through [`airgap_byte_array_free`]. Every
//! fallible call reports the stable status codes from [`AirgapError::code`],
//! with 0 meaning success.

use std::ffi::{c_char, CStr};
use std::ptr;
use std::slice;

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::AirgapError;

pub const AIRGAP_OK: isize = 0;

/// Byte buffer handed across the boundary. `data` may be non-null even when
/// `len` is 0; it is only guaranteed valid for `len` bytes.
#[repr(C)]
pub struct ByteArray {
    pub data: *mut u8,
    pub len: usize,
}

impl ByteArray {
    fn from_vec(bytes: Vec<u8>) -> ByteArray {
        let mut boxed = bytes.into_boxed_slice();
        let array = ByteArray {
            data: boxed.as_mut_ptr(),
            len: boxed.len(),
        };
        std::mem::forget(boxed);
        array
    }
}

fn status(result: Result<(), AirgapError>) -> isize {
    match result {
        Ok(()) => AIRGAP_OK,
        Err(err) => err.code() as isize,
    }
}

/// Creates an encoder for `data_len` bytes at `data`, split into frames of
/// `chunk_size` bytes. Returns null on any construction error.
///
/// # Safety
/// `data` must point to `data_len` readable bytes, or be null with
/// `data_len` of 0.
#[no_mangle]
pub unsafe extern "C" fn airgap_encoder_new(
    data: *const u8,
    data_len: usize,
    chunk_size: usize,
) -> *mut Encoder {
    if data.is_null() && data_len > 0 {
        return ptr::null_mut();
    }
    let payload: &[u8] = if data_len == 0 {
        &[]
    } else {
        slice::from_raw_parts(data, data_len)
    };
    match Encoder::new(payload, chunk_size) {
        Ok(encoder) => Box::into_raw(Box::new(encoder)),
        Err(_) => ptr::null_mut(),
    }
}

/// # Safety
/// `encoder` must be a pointer from [`airgap_encoder_new`] that has not been
/// freed, or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_encoder_free(encoder: *mut Encoder) {
    if !encoder.is_null() {
        drop(Box::from_raw(encoder));
    }
}

/// # Safety
/// `encoder` must be a live encoder handle or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_encoder_chunk_count(encoder: *const Encoder) -> usize {
    match encoder.as_ref() {
        Some(encoder) => encoder.chunk_count(),
        None => 0,
    }
}

/// # Safety
/// `encoder` must be a live encoder handle or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_encoder_session_id(encoder: *const Encoder) -> u32 {
    match encoder.as_ref() {
        Some(encoder) => encoder.session_id(),
        None => 0,
    }
}

/// Renders frame `index` as PNG bytes into `result`. The caller owns the
/// buffer on success.
///
/// # Safety
/// `encoder` must be a live encoder handle or null; `result` must be a
/// valid, writable pointer or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_encoder_generate_png(
    encoder: *const Encoder,
    index: usize,
    result: *mut ByteArray,
) -> isize {
    let (Some(encoder), Some(result)) = (encoder.as_ref(), result.as_mut()) else {
        return AirgapError::NullPointer.code() as isize;
    };
    status(encoder.generate_png(index).map(|png| {
        *result = ByteArray::from_vec(png);
    }))
}

#[no_mangle]
pub extern "C" fn airgap_decoder_new() -> *mut Decoder {
    Box::into_raw(Box::new(Decoder::new()))
}

/// # Safety
/// `decoder` must be a pointer from [`airgap_decoder_new`] that has not been
/// freed, or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_free(decoder: *mut Decoder) {
    if !decoder.is_null() {
        drop(Box::from_raw(decoder));
    }
}

/// # Safety
/// `decoder` must be a live decoder handle or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_is_complete(decoder: *const Decoder) -> bool {
    match decoder.as_ref() {
        Some(decoder) => decoder.is_complete(),
        None => false,
    }
}

/// # Safety
/// `decoder` must be a live decoder handle or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_get_total(decoder: *const Decoder) -> usize {
    match decoder.as_ref() {
        Some(decoder) => decoder.total_chunks(),
        None => 0,
    }
}

/// # Safety
/// `decoder` must be a live decoder handle or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_get_received(decoder: *const Decoder) -> usize {
    match decoder.as_ref() {
        Some(decoder) => decoder.received_chunks(),
        None => 0,
    }
}

/// Feeds one scanned QR string to the decoder.
///
/// # Safety
/// `decoder` must be a live decoder handle or null; `qr_string` must be a
/// NUL-terminated C string or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_process_qr(
    decoder: *mut Decoder,
    qr_string: *const c_char,
) -> isize {
    let Some(decoder) = decoder.as_mut() else {
        return AirgapError::NullPointer.code() as isize;
    };
    if qr_string.is_null() {
        return AirgapError::NullPointer.code() as isize;
    }
    let Ok(text) = CStr::from_ptr(qr_string).to_str() else {
        return AirgapError::Encoding.code() as isize;
    };
    status(decoder.process_qr(text).map(|_| ()))
}

/// Copies the reassembled payload into `result` once the transfer is
/// complete. The caller owns the buffer on success.
///
/// # Safety
/// `decoder` must be a live decoder handle or null; `result` must be a
/// valid, writable pointer or null.
#[no_mangle]
pub unsafe extern "C" fn airgap_decoder_get_data(
    decoder: *const Decoder,
    result: *mut ByteArray,
) -> isize {
    let (Some(decoder), Some(result)) = (decoder.as_ref(), result.as_mut()) else {
        return AirgapError::NullPointer.code() as isize;
    };
    status(decoder.data().map(|data| {
        *result = ByteArray::from_vec(data);
    }))
}

/// Releases a buffer previously returned by this library.
///
/// # Safety
/// `array` must have come from this library and not have been freed before.
#[no_mangle]
pub unsafe extern "C" fn airgap_byte_array_free(array: ByteArray) {
    if !array.data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            array.data, array.len,
        )));
    }
}
