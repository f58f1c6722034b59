//! Terminator scanning.
//!
//! Locates the zero byte that ends a null-terminated field inside a chunk
//! that may also carry bytes of the fields that follow it.

/// Byte value marking the end of a null-terminated field.
pub const TERMINATOR: u8 = 0x00;

/// Find the first terminator in `buf[start..end]`.
///
/// Returns the absolute index into `buf`, or `None` if the range holds no
/// terminator. A range that does not fit inside `buf` (or has
/// `start > end`) is treated as empty: nothing outside `buf` is read.
///
/// # Example
///
/// ```
/// use cstring_wire::protocol::find_terminator;
///
/// let buf = b"ab\0cd\0";
/// assert_eq!(find_terminator(buf, 0, buf.len()), Some(2));
/// assert_eq!(find_terminator(buf, 3, buf.len()), Some(5));
/// assert_eq!(find_terminator(buf, 3, 5), None);
/// ```
#[inline]
pub fn find_terminator(buf: &[u8], start: usize, end: usize) -> Option<usize> {
    let window = buf.get(start..end)?;
    memchr::memchr(TERMINATOR, window).map(|i| start + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_at_start() {
        assert_eq!(find_terminator(b"\0abc", 0, 4), Some(0));
    }

    #[test]
    fn test_returns_lowest_index() {
        assert_eq!(find_terminator(b"a\0b\0", 0, 4), Some(1));
    }

    #[test]
    fn test_respects_range_start() {
        // Zero before the range is ignored
        assert_eq!(find_terminator(b"\0ab\0", 1, 4), Some(3));
    }

    #[test]
    fn test_respects_range_end() {
        // Zero at `end` is outside the half-open range
        assert_eq!(find_terminator(b"abc\0", 0, 3), None);
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(find_terminator(b"\0", 0, 0), None);
        assert_eq!(find_terminator(b"\0", 1, 1), None);
    }

    #[test]
    fn test_out_of_bounds_range() {
        assert_eq!(find_terminator(b"ab", 0, 10), None);
        assert_eq!(find_terminator(b"a\0", 2, 1), None);
    }

    #[test]
    fn test_large_buffer() {
        let mut buf = vec![0xAB; 64 * 1024];
        buf[40_000] = 0;
        assert_eq!(find_terminator(&buf, 0, buf.len()), Some(40_000));
        assert_eq!(find_terminator(&buf, 40_001, buf.len()), None);
    }
}
