//! Length-prefixed, optionally compressed frame layer (spec §4.6 "Frame
//! layout"). Grounded on `relay_weechat_msg_send`'s header-then-payload
//! layout and `relay_weechat_msg_compress_zlib`'s "only keep the
//! compressed form if it's smaller" rule.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression as ZlibLevel;

use super::RelayError;

const HEADER_LEN: usize = 5;

/// The compression scheme tagged on a frame's header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// `compression=0`: payload follows uncompressed.
    Off,
    /// `compression=1`: payload is zlib-compressed.
    Zlib,
    /// `compression=2`: recognized so a peer's zstd frame doesn't
    /// misparse as a protocol error, but this build cannot decode it.
    Zstd,
}

impl Compression {
    fn tag(self) -> u8 {
        match self {
            Compression::Off => 0,
            Compression::Zlib => 1,
            Compression::Zstd => 2,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, RelayError> {
        match tag {
            0 => Ok(Compression::Off),
            1 => Ok(Compression::Zlib),
            2 => Ok(Compression::Zstd),
            other => Err(RelayError::UnsupportedCompression(other)),
        }
    }
}

/// Encodes `payload` as a complete frame (header + body), compressing
/// with zlib only if the compressed form comes out strictly smaller.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut compressed = Vec::new();
    let mut encoder = ZlibEncoder::new(&mut compressed, ZlibLevel::default());
    let zlib_ok = encoder.write_all(payload).and_then(|_| encoder.try_finish()).is_ok();

    let (compression, body): (Compression, &[u8]) = if zlib_ok && compressed.len() < payload.len() {
        (Compression::Zlib, &compressed)
    } else {
        (Compression::Off, payload)
    };

    let total_length = (HEADER_LEN + body.len()) as u32;
    let mut frame = Vec::with_capacity(total_length as usize);
    frame.extend_from_slice(&total_length.to_be_bytes());
    frame.push(compression.tag());
    frame.extend_from_slice(body);
    frame
}

/// Decodes one frame from the front of `buf`, returning the decompressed
/// payload and the number of bytes consumed. Returns
/// `RelayError::Truncated` if `buf` doesn't yet hold a complete frame —
/// callers should retry once more bytes arrive, not treat it as fatal.
pub fn decode_frame(buf: &[u8]) -> Result<(Vec<u8>, usize), RelayError> {
    if buf.len() < HEADER_LEN {
        return Err(RelayError::Truncated { need: HEADER_LEN - buf.len() });
    }
    let total_length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if total_length < HEADER_LEN {
        return Err(RelayError::Malformed(format!(
            "frame total_length {total_length} is smaller than the header"
        )));
    }
    if buf.len() < total_length {
        return Err(RelayError::Truncated { need: total_length - buf.len() });
    }

    let compression = Compression::from_tag(buf[4])?;
    let body = &buf[HEADER_LEN..total_length];
    let payload = match compression {
        Compression::Off => body.to_vec(),
        Compression::Zlib => {
            use std::io::Read;
            let mut decoder = flate2::read::ZlibDecoder::new(body);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| RelayError::Malformed(format!("zlib inflate failed: {e}")))?;
            out
        }
        Compression::Zstd => return Err(RelayError::UnsupportedCompression(Compression::Zstd.tag())),
    };
    Ok((payload, total_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_payload_uncompressed() {
        let payload = b"(1) hdata";
        let frame = encode_frame(payload);
        assert_eq!(frame[4], Compression::Off.tag());
        let (decoded, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn round_trips_compressible_payload_via_zlib() {
        let payload = vec![b'a'; 4096];
        let frame = encode_frame(&payload);
        assert_eq!(frame[4], Compression::Zlib.tag());
        assert!(frame.len() < payload.len());
        let (decoded, _) = decode_frame(&frame).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn partial_header_reports_truncated() {
        let err = decode_frame(&[0, 0]).unwrap_err();
        assert!(matches!(err, RelayError::Truncated { .. }));
    }

    #[test]
    fn partial_body_reports_truncated() {
        let frame = encode_frame(b"hello world");
        let err = decode_frame(&frame[..frame.len() - 2]).unwrap_err();
        assert!(matches!(err, RelayError::Truncated { .. }));
    }

    #[test]
    fn unknown_compression_tag_is_rejected() {
        let mut frame = encode_frame(b"x");
        frame[4] = 9;
        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedCompression(9)));
    }

    #[test]
    fn zstd_tag_is_recognized_but_unsupported() {
        let mut frame = encode_frame(b"x");
        frame[4] = 2;
        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedCompression(2)));
    }
}
