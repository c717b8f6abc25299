use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

/// A source file's path and text, shared by every location/span that points into it.
#[derive(Debug, Serialize)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
        let text = text.into();
        let mut line_starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Arc::new(Self {
            path: path.into(),
            text,
            line_starts,
        })
    }

    /// 1-based line, 0-based column for a byte position.
    fn line_col(&self, position: u32) -> (u32, u32) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= position)
            .saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = position - self.line_starts[line_idx];
        (line, col)
    }

    pub fn get_line_text(&self, line: u32) -> &str {
        let idx = (line - 1) as usize;
        let start = self.line_starts.get(idx).copied().unwrap_or(0) as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e as usize)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }
}

/// A single point in a source file: byte position plus its derived line/column.
///
/// Supports pointwise arithmetic via `add`/`sub`. `PartialOrd`/`Ord` compare by byte
/// position and are consistent in both directions (see design notes on this point).
#[derive(Debug, Clone, Serialize)]
pub struct FileLocation {
    pub position: u32,
    pub line: u32,
    pub column: u32,
    #[serde(skip)]
    pub file: Arc<SourceFile>,
}

impl FileLocation {
    pub fn new(file: Arc<SourceFile>, position: u32) -> Self {
        let (line, column) = file.line_col(position);
        Self {
            position,
            line,
            column,
            file,
        }
    }

    pub fn add(&self, offset: i64) -> Self {
        let position = (self.position as i64 + offset).max(0) as u32;
        Self::new(self.file.clone(), position)
    }

    pub fn sub(&self, offset: i64) -> Self {
        self.add(-offset)
    }
}

impl PartialEq for FileLocation {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && Arc::ptr_eq(&self.file, &other.file)
    }
}
impl Eq for FileLocation {}

impl PartialOrd for FileLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FileLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position.cmp(&other.position)
    }
}

/// An ordered pair of [`FileLocation`]s delimiting a token or AST node.
#[derive(Debug, Clone, Serialize)]
pub struct FileSpan {
    pub start: FileLocation,
    pub end: FileLocation,
}

impl FileSpan {
    pub fn new(start: FileLocation, end: FileLocation) -> Self {
        Self { start, end }
    }

    pub fn get_text(&self) -> &str {
        &self.start.file.text[self.start.position as usize..self.end.position as usize]
    }

    /// The full source line containing the start of this span.
    pub fn get_line(&self) -> &str {
        self.start.file.get_line_text(self.start.line)
    }

    pub fn has_line_break_between(&self, other: &FileSpan) -> bool {
        self.end.line != other.start.line
    }
}

impl PartialEq for FileSpan {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}
impl Eq for FileSpan {}
