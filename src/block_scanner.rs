//! Locates `/** ... */` comment regions in source text.

/// Line that opens a documentation comment
pub const OPEN_MARKER: &str = "/**";
/// Line that closes a documentation comment
pub const CLOSE_MARKER: &str = "*/";

/// A closed comment region found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommentBlock {
    /// Index of the opening marker line
    pub start_line: usize,
    /// Index of the closing marker line
    pub end_line: usize,
    /// Trimmed lines from the opening marker to the closing marker, inclusive
    pub raw_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Searching,
    InBlock { start: usize },
}

/// Splits file text on line breaks, dropping empty lines.
///
/// Line numbers reported by [`scan_blocks`] are indexes into this list.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(['\n', '\r']).filter(|l| !l.is_empty()).collect()
}

/// Extracts every closed comment block, in file order.
///
/// Only one region can be open at a time; an opening marker seen inside an
/// open region is treated as content, and a region still open at end of input
/// is dropped.
pub fn scan_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<SourceCommentBlock> {
    let mut blocks = Vec::new();
    let mut state = ScanState::Searching;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.as_ref().trim();
        state = match state {
            ScanState::Searching if trimmed == OPEN_MARKER => ScanState::InBlock { start: index },
            ScanState::InBlock { start } if trimmed == CLOSE_MARKER => {
                blocks.push(SourceCommentBlock {
                    start_line: start,
                    end_line: index,
                    raw_lines: lines[start..=index]
                        .iter()
                        .map(|l| l.as_ref().trim().to_string())
                        .collect(),
                });
                ScanState::Searching
            }
            unchanged => unchanged,
        };
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let lines = split_lines("const a = 1;\n/**\n * @route GET /a\n */\nfunction a() {}\n");
        let blocks = scan_blocks(&lines);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 1);
        assert_eq!(blocks[0].end_line, 3);
        assert_eq!(blocks[0].raw_lines, vec!["/**", "* @route GET /a", "*/"]);
    }

    #[test]
    fn test_block_on_first_and_last_line() {
        let lines = vec!["/**", "* @route GET /a", "*/"];
        let blocks = scan_blocks(&lines);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 0);
        assert_eq!(blocks[0].end_line, 2);
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let lines = vec!["/**", "* one", "*/", "code();", "   /**  ", "* two", "  */"];
        let blocks = scan_blocks(&lines);

        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 2));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (4, 6));
        assert_eq!(blocks[1].raw_lines[1], "* two");
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        let lines = vec!["/**", "* one", "*/", "/**", "* never closed"];
        let blocks = scan_blocks(&lines);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].end_line, 2);
    }

    #[test]
    fn test_nested_open_marker_is_content() {
        let lines = vec!["/**", "/**", "* inner", "*/", "*/"];
        let blocks = scan_blocks(&lines);

        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (0, 3));
    }

    #[test]
    fn test_close_without_open_is_ignored() {
        let lines = vec!["*/", "code();"];
        assert!(scan_blocks(&lines).is_empty());
    }

    #[test]
    fn test_inline_markers_do_not_count() {
        let lines = vec!["/** inline */", "/* plain */", "x(); /**"];
        assert!(scan_blocks(&lines).is_empty());
    }

    #[test]
    fn test_split_lines_drops_empty_lines() {
        let lines = split_lines("a\r\n\r\nb\n\nc");
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
