//! Incremental UTF-8 decoding for chunked byte streams.

/// Decodes UTF-8 text that may be split at arbitrary byte offsets.
///
/// A code point cut in half by a chunk boundary is held back until the next
/// chunk completes it, so a split sequence never turns into `U+FFFD`.
/// Bytes that can never form valid UTF-8 are replaced as `from_utf8_lossy`
/// would.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    partial: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, prefixing any bytes carried from the last call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.partial);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the input.
                            self.partial = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Number of bytes held back waiting for the rest of a code point.
    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.partial.len()
    }

    /// End of input. Returns how many bytes of an unfinished code point were
    /// dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.partial.len();
        self.partial.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"data: hi\n"), "data: hi\n");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_code_point_split_across_chunks() {
        let bytes = "🧬 cell".as_bytes();
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert_eq!(decoder.decode(&bytes[1..3]), "");
        assert_eq!(decoder.pending_len(), 3);
        assert_eq!(decoder.decode(&bytes[3..]), "🧬 cell");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_every_split_point_round_trips() {
        let text = "Mikrogravitation — ß, µ, 宇宙, 🚀!";
        let bytes = text.as_bytes();

        for split in 0..=bytes.len() {
            let mut decoder = Utf8Decoder::new();
            let mut out = decoder.decode(&bytes[..split]);
            out.push_str(&decoder.decode(&bytes[split..]));
            assert_eq!(out, text, "split at byte {}", split);
            assert_eq!(decoder.finish(), 0);
        }
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_finish_drops_unfinished_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), 1);
        assert_eq!(decoder.decode(b"x"), "x");
    }
}
