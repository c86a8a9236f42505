//! Markdown primitives used by the page writer.
use std::fmt::Write as _;

/// Characters with Markdown meaning, escaped in plain-text type names.
const SPECIAL: &[char] = &[
    '\\', '`', '*', '-', '{', '}', '[', ']', '<', '>', '(', ')', '#', '+', '.', '!', '|',
];

/// Line break inside a table cell or paragraph.
pub const LINE_BREAK: &str = "<br>";

/// Placeholder for absent documentation.
pub const MISSING: &str = "-";

/// `#`-prefixed heading, level clamped to 1..=6.
pub fn header(level: usize, text: &str) -> String {
    let hashes = "#".repeat(level.clamp(1, 6));
    return format!("{hashes} {text}");
}

/// `**text**`.
pub fn bold(text: &str) -> String {
    return format!("**{text}**");
}

/// `*text*`.
pub fn italic(text: &str) -> String {
    return format!("*{text}*");
}

/// Inline code span.
pub fn keyword(text: &str) -> String {
    return format!("`{text}`");
}

/// `[text](url "title")`. Angle brackets in the link text are escaped so
/// generic names survive HTML-aware renderers.
pub fn hyperlink(text: &str, url: &str) -> String {
    let title = text.replace('"', "");
    return format!("[{}]({url} \"{title}\")", escape_chars(text, &['<', '>']));
}

/// Bullet at nesting `level` (1 = top level).
pub fn bullet(level: usize, text: &str) -> String {
    let indent = "    ".repeat(level.max(1).saturating_sub(1));
    return format!("{indent}* {text}");
}

/// Fenced code block.
pub fn code(source: &str, language: &str) -> String {
    return format!("``` {language}\n{source}\n```");
}

/// Pipe table with a `---` separator row. Rows shorter than the header are
/// padded with empty cells.
pub fn table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "|{}|", columns.join("|"));
    let _ = writeln!(out, "|{}|", vec!["---"; columns.len()].join("|"));
    for row in rows {
        let mut cells: Vec<String> = row.iter().map(|c| return cell(c)).collect();
        cells.resize(columns.len().max(cells.len()), String::new());
        let _ = writeln!(out, "|{}|", cells.join("|"));
    }
    return out;
}

/// Make free text safe for one table cell: no raw newlines, no bare pipes.
/// Pipes that are already escaped are left alone.
fn cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\n' => out.push_str(LINE_BREAK),
            '|' if !escaped => out.push_str("\\|"),
            _ => out.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    return out;
}

/// Backslash-escape every Markdown special character.
pub fn escape(text: &str) -> String {
    return escape_chars(text, SPECIAL);
}

/// Backslash-escape only the given characters.
pub fn escape_chars(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if chars.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_levels_clamp() {
        assert_eq!(header(0, "A"), "# A");
        assert_eq!(header(3, "A"), "### A");
        assert_eq!(header(9, "A"), "###### A");
    }

    #[test]
    fn hyperlink_escapes_angle_brackets_in_text() {
        assert_eq!(hyperlink("Box<T>", "./Demo.Box.md"), "[Box\\<T\\>](./Demo.Box.md \"Box<T>\")");
    }

    #[test]
    fn escape_every_special_once() {
        assert_eq!(escape("List<int>[]"), "List\\<int\\>\\[\\]");
        assert_eq!(escape("a-b.c"), "a\\-b\\.c");
        assert_eq!(escape("\\"), "\\\\");
    }

    #[test]
    fn bullets_indent_by_level() {
        assert_eq!(bullet(1, "a"), "* a");
        assert_eq!(bullet(3, "c"), "        * c");
    }

    #[test]
    fn table_layout() {
        let rows = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        assert_eq!(table(&["X", "Y"], &rows), "|X|Y|\n|---|---|\n|a|b|\n|c||\n");
    }

    #[test]
    fn every_bare_pipe_in_a_cell_is_escaped() {
        let rows = vec![vec!["a|b".to_string(), "x | y\nz".to_string(), "pre\\|done".to_string()]];
        assert_eq!(
            table(&["A", "B", "C"], &rows),
            "|A|B|C|\n|---|---|---|\n|a\\|b|x \\| y<br>z|pre\\|done|\n"
        );
    }

    #[test]
    fn code_fence() {
        assert_eq!(code("public class Box", "csharp"), "``` csharp\npublic class Box\n```");
    }
}
