//! Line-level markdown recognition shared by both passes.
//!
//! Only two constructs matter to the engine: ATX heading lines and fenced
//! code blocks. Both passes must agree exactly on what counts as a heading,
//! so the recognizers live here and nowhere else.

/// Fence delimiter that opens and closes a code block.
pub const FENCE: &str = "```";

/// Highest ATX heading level.
pub const MAX_LEVEL: usize = 6;

/// Tracks whether the current line sits inside a fenced code block.
#[derive(Debug, Default)]
pub struct FenceState {
    open: bool,
}

impl FenceState {
    /// Feed the next line. Returns `true` when the line is code (either
    /// inside a fence or a fence delimiter itself) and must not be
    /// interpreted as markdown.
    pub fn is_code(&mut self, line: &str) -> bool {
        if line.trim_start().starts_with(FENCE) {
            self.open = !self.open;
            return true;
        }
        self.open
    }
}

/// Split an ATX heading line into `(level, title)`.
///
/// A heading is a run of one to six `#` at the very start of the line,
/// followed by whitespace or the end of the line. The title is the trimmed
/// remainder.
///
/// - `"## Install"` → `Some((2, "Install"))`
/// - `"#"` → `Some((1, ""))`
/// - `"#hashtag"` → `None`
/// - `"####### seven"` → `None`
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > MAX_LEVEL {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim()))
}
