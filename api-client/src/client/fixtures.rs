use std::io::Cursor;

use bytes::Bytes;
use futures::Stream;
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;

use crate::error::Error;
use crate::error::Result;

/// Re-chunk `bytes` into fixed-size pieces, for exercising decode
/// behavior at arbitrary chunk boundaries.
pub fn chunk_stream(bytes: &[u8], chunk_size: usize) -> impl Stream<Item = Result<Bytes>> + Unpin {
    let chunks: Vec<Result<Bytes>> = bytes
        .chunks(chunk_size.max(1))
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    futures::stream::iter(chunks)
}

/// A stream with explicit per-item boundaries, including mid-stream
/// read failures.
pub fn stream_from_results(items: Vec<Result<Bytes>>) -> impl Stream<Item = Result<Bytes>> + Unpin {
    futures::stream::iter(items)
}

/// Reader-backed fixture stream, chunked by the reader's internal
/// buffer.
pub fn stream_from_fixture(contents: impl Into<String>) -> impl Stream<Item = Result<Bytes>> + Unpin {
    ReaderStream::new(Cursor::new(contents.into())).map_err(|err| Error::Other(err.to_string()))
}
