/// Incremental UTF-8 decoder for transport chunks that may split a
/// multi-byte character anywhere.
///
/// Bytes forming an incomplete trailing sequence are held back and
/// prefixed onto the next chunk. The final call (with `more == false`)
/// force-flushes whatever is left so no bytes are silently lost; invalid
/// sequences decode to U+FFFD instead of erroring.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, returning all completable text. `more` signals
    /// that further chunks may follow; pass `false` exactly once at end
    /// of stream (an empty `bytes` is fine) to flush held-back bytes.
    pub fn decode(&mut self, bytes: &[u8], more: bool) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // valid_up_to guarantees this prefix is well-formed
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the buffer.
                            if more {
                                self.pending = after.to_vec();
                            } else {
                                out.push(char::REPLACEMENT_CHARACTER);
                            }
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}
