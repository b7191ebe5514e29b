//! Markdown checkbox line mapper.
//!
//! # Responsibility
//! - Locate task-list lines (`- [ ] `, `- [x] `, `- [X] `) in raw markdown
//!   and report their exact byte ranges.
//! - Rewrite one checkbox by index without touching any other byte.
//!
//! # Invariants
//! - Entries are ordered top-to-bottom, matching rendered checkbox order.
//! - Identical input always yields identical offsets and ordering.
//! - `content[..line_start] + line + content[line_end..] == content`.
//! - Every line is scanned, including the first one.

use serde::Serialize;

const TODO_MARKERS: [&str; 3] = ["- [ ] ", "- [x] ", "- [X] "];
/// Byte offset of the check character inside a marker (`- [` is 3 bytes).
const CHECK_OFFSET: usize = 3;

/// One checkbox line. Offsets are UTF-8 byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoLine {
    pub line_start: usize,
    /// Exclusive; points at the terminating `\n` or the end of input.
    pub line_end: usize,
    /// Line text as written, without the trailing `\n`.
    pub line: String,
}

impl TodoLine {
    /// Returns `content` with this line replaced by `replacement`.
    pub fn splice(&self, content: &str, replacement: &str) -> String {
        let mut out = String::with_capacity(
            content.len() - (self.line_end - self.line_start) + replacement.len(),
        );
        out.push_str(&content[..self.line_start]);
        out.push_str(replacement);
        out.push_str(&content[self.line_end..]);
        out
    }

    pub fn is_checked(&self) -> bool {
        let indent = self.line.len() - self.line.trim_start().len();
        matches!(
            self.line.as_bytes().get(indent + CHECK_OFFSET),
            Some(b'x' | b'X')
        )
    }
}

/// Lists every checkbox line of `content` in document order.
pub fn lex_todos(content: &str) -> Vec<TodoLine> {
    let mut todos = Vec::new();
    let mut line_start = 0;

    loop {
        let line_end = content[line_start..]
            .find('\n')
            .map_or(content.len(), |offset| line_start + offset);
        let line = &content[line_start..line_end];
        if is_todo_line(line) {
            todos.push(TodoLine {
                line_start,
                line_end,
                line: line.to_string(),
            });
        }
        if line_end == content.len() {
            break;
        }
        line_start = line_end + 1;
    }

    todos
}

/// Sets the checkbox at `index` to `checked` and returns the new document.
///
/// Returns `None` when `content` has fewer than `index + 1` checkboxes.
pub fn set_todo_checked(content: &str, index: usize, checked: bool) -> Option<String> {
    let todo = lex_todos(content).into_iter().nth(index)?;
    let indent = todo.line.len() - todo.line.trim_start().len();
    let check_at = indent + CHECK_OFFSET;
    let mark = if checked { "x" } else { " " };

    let mut line = String::with_capacity(todo.line.len());
    line.push_str(&todo.line[..check_at]);
    line.push_str(mark);
    line.push_str(&todo.line[check_at + 1..]);
    Some(todo.splice(content, &line))
}

fn is_todo_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    TODO_MARKERS
        .iter()
        .any(|marker| trimmed.starts_with(marker))
}
