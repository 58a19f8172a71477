//! Stack frame line recognition and rewriting
//!
//! A symbolicatable frame line looks like:
//!
//! ```text
//! 12  MyLib   0x0000000104a1c3f0   0x0000000104a00000   + 115696
//! ^   ^       ^                    ^                    ^
//! |   |       call address         load address         offset suffix
//! |   library name
//! frame index
//! ```
//!
//! Every whitespace run is captured verbatim so that a rewritten line keeps
//! the column alignment of the original log. Anything after the offset digits
//! (trailing blanks, an `(in MyLib)` note) belongs to the offset suffix and is
//! dropped together with it on rewrite.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::HexAddress;

static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]+)([ \t]+)([^ \t]+)([ \t]+)(0x[0-9a-fA-F]+)([ \t]+)(0x[0-9a-fA-F]+)([ \t]+)(\+[ \t]+[0-9]+[^\r]*)(\r?)$",
    )
    .expect("valid regex")
});

/// A log line that matched the frame shape, split into its segments
///
/// Concatenating the segments in declaration order yields the original line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLine<'a> {
    pub frame_index: &'a str,
    pub index_gap: &'a str,
    pub library: &'a str,
    pub library_gap: &'a str,
    pub call_address: &'a str,
    pub call_gap: &'a str,
    pub load_address: &'a str,
    pub load_gap: &'a str,
    /// `+ <offset>` plus any trailing text, superseded by the symbol on rewrite
    pub offset_suffix: &'a str,
    /// A trailing `\r` from CRLF logs, or empty
    pub line_ending: &'a str,
}

impl<'a> FrameLine<'a> {
    /// Match `line` against the frame shape
    ///
    /// Returns `None` for any line that does not have the frame shape; such
    /// lines are passed through untouched.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = FRAME_LINE.captures(line)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        Some(Self {
            frame_index: group(1),
            index_gap: group(2),
            library: group(3),
            library_gap: group(4),
            call_address: group(5),
            call_gap: group(6),
            load_address: group(7),
            load_gap: group(8),
            offset_suffix: group(9),
            line_ending: group(10),
        })
    }

    #[must_use]
    pub fn call_address(&self) -> HexAddress {
        HexAddress(self.call_address.to_string())
    }

    #[must_use]
    pub fn load_address(&self) -> HexAddress {
        HexAddress(self.load_address.to_string())
    }

    /// Everything up to and including the whitespace before the offset suffix
    fn prefix(&self) -> String {
        [
            self.frame_index,
            self.index_gap,
            self.library,
            self.library_gap,
            self.call_address,
            self.call_gap,
            self.load_address,
            self.load_gap,
        ]
        .concat()
    }

    /// Rebuild the line with `symbol` in place of the offset suffix
    #[must_use]
    pub fn rewrite(&self, symbol: &str) -> String {
        let mut line = self.prefix();
        line.push_str(symbol);
        line.push_str(self.line_ending);
        line
    }

    /// Rebuild the original line from its segments
    #[cfg(test)]
    pub fn reconstruct(&self) -> String {
        let mut line = self.prefix();
        line.push_str(self.offset_suffix);
        line.push_str(self.line_ending);
        line
    }
}
