use std::io::{self, ErrorKind, Read};

pub mod fiber_stream;
pub mod header;

/// Fills `buf` as far as the stream allows and returns the number of bytes read.
/// Unlike `read_exact` a short count is reported instead of an error, so callers
/// can say exactly where the input ended.
pub(crate) fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
