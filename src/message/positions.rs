//! Byte offsets into a parsed line (spec §3.2, §4.1 rule 6, §8.2 scenario 1).
//!
//! The distillation this crate implements describes these informally as
//! "byte offsets... for zero-copy downstream users"; here they are an
//! explicit struct attached to [`super::MessageRef`] so a caller that only
//! needs to relocate a substring of the original line never has to
//! re-parse it.

/// Byte offsets of the command, argument list, channel slot, and trailing
/// text within the original (untrimmed-of-CRLF) input line.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ParsePositions {
    /// Offset of the first byte of the command token.
    pub pos_command: usize,
    /// Offset of the first byte of the argument list, or the offset just
    /// past the command if there are no arguments.
    pub pos_arguments: usize,
    /// Offset of the first byte of the parameter recognized as the
    /// channel slot (rule 6), if any.
    pub pos_channel: Option<usize>,
    /// Offset of the first byte of the trailing (colon-introduced)
    /// parameter's body, if the message had one.
    pub pos_text: Option<usize>,
}

/// Computes `needle`'s byte offset within `haystack`, assuming `needle` is
/// a substring slice borrowed from `haystack` (true for every field the
/// nom parser hands back, since it never copies).
pub(super) fn offset_of(haystack: &str, needle: &str) -> usize {
    let base = haystack.as_ptr() as usize;
    let ptr = needle.as_ptr() as usize;
    debug_assert!(
        ptr >= base && ptr <= base + haystack.len(),
        "needle is not a slice of haystack"
    );
    ptr - base
}
