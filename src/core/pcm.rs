//! Little-endian 16-bit PCM helpers shared by processors and file jobs.

/// Read one sample from the front of `input`, advancing it.
///
/// Returns `None` when fewer than two bytes remain; a lone trailing byte is
/// left in place for the caller to discard.
pub fn read_i16_le(input: &mut &[u8]) -> Option<i16> {
    let bytes: &[u8] = *input;
    match bytes {
        [lo, hi, rest @ ..] => {
            *input = rest;
            Some(i16::from_le_bytes([*lo, *hi]))
        }
        _ => None,
    }
}

/// Encode samples as interleaved little-endian bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Decode little-endian bytes; a trailing odd byte is dropped
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
