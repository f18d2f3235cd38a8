use std::fmt::Write as _;
use std::ops::Range;

use colored::Colorize;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::model::MatchRecord;

/// Lines of context shown on each side of the match.
pub const CONTEXT_LINES: usize = 2;

/// How the query is matched against the center line for highlighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Treat the query as a regular expression, like the search server does.
    #[default]
    Pattern,
    /// Highlight the query text verbatim.
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// One gutter-numbered row of a result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextLine {
    pub number: i64,
    /// `None` when the server sent no line for this position.
    pub content: Option<String>,
    /// Set only on the match line.
    pub query: Option<String>,
    pub segments: Vec<Segment>,
}

impl ContextLine {
    /// Everything the row's appearance depends on.
    pub fn key(&self) -> (i64, Option<&str>, Option<&str>) {
        (self.number, self.content.as_deref(), self.query.as_deref())
    }

    pub fn needs_redraw(&self, previous: &ContextLine) -> bool {
        self.key() != previous.key()
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub path: String,
    pub line_number: i64,
    pub lines: [ContextLine; 2 * CONTEXT_LINES + 1],
}

/// Compiled highlight matcher for one query.
pub struct Highlighter {
    regex: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str, mode: HighlightMode) -> Self {
        if query.is_empty() {
            return Self { regex: None };
        }

        let regex = match mode {
            HighlightMode::Pattern => match Regex::new(query) {
                Ok(re) => Some(re),
                Err(err) => {
                    debug!("query is not a valid pattern, highlighting literally: {err}");
                    Regex::new(&regex::escape(query)).ok()
                }
            },
            HighlightMode::Literal => Regex::new(&regex::escape(query)).ok(),
        };

        Self { regex }
    }

    /// Byte ranges of every non-overlapping, non-empty occurrence.
    pub fn spans(&self, line: &str) -> Vec<Range<usize>> {
        let Some(re) = &self.regex else {
            return Vec::new();
        };
        re.find_iter(line)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
            .collect()
    }

    pub fn segments(&self, line: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for span in self.spans(line) {
            if span.start > cursor {
                segments.push(Segment {
                    text: line[cursor..span.start].to_string(),
                    highlighted: false,
                });
            }
            segments.push(Segment {
                text: line[span.clone()].to_string(),
                highlighted: true,
            });
            cursor = span.end;
        }

        if cursor < line.len() {
            segments.push(Segment {
                text: line[cursor..].to_string(),
                highlighted: false,
            });
        }

        segments
    }
}

pub fn render(record: &MatchRecord, mode: HighlightMode) -> RenderedBlock {
    let highlighter = Highlighter::new(&record.query, mode);
    render_with(&highlighter, record)
}

/// Build the five-row block for a record. Only the match row is highlighted.
pub fn render_with(highlighter: &Highlighter, record: &MatchRecord) -> RenderedBlock {
    let code_match = &record.code_match;
    let center = code_match.line_number;

    // `before` ends right above the match, `after` starts right below it.
    let before_at = |distance: usize| -> Option<String> {
        code_match
            .before
            .len()
            .checked_sub(distance)
            .and_then(|idx| code_match.before.get(idx))
            .cloned()
    };
    let after_at = |distance: usize| -> Option<String> {
        code_match.after.get(distance - 1).cloned()
    };

    let plain = |number: i64, content: Option<String>| {
        let segments = content
            .as_ref()
            .filter(|text| !text.is_empty())
            .map(|text| {
                vec![Segment {
                    text: text.clone(),
                    highlighted: false,
                }]
            })
            .unwrap_or_default();
        ContextLine {
            number,
            content,
            query: None,
            segments,
        }
    };

    let match_line = ContextLine {
        number: center,
        content: Some(code_match.line.clone()),
        query: Some(record.query.clone()),
        segments: highlighter.segments(&code_match.line),
    };

    RenderedBlock {
        path: record.path.clone(),
        line_number: center,
        lines: [
            plain(center - 2, before_at(2)),
            plain(center - 1, before_at(1)),
            match_line,
            plain(center + 1, after_at(1)),
            plain(center + 2, after_at(2)),
        ],
    }
}

impl RenderedBlock {
    fn gutter_width(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.number.to_string().len())
            .max()
            .unwrap_or(1)
    }

    /// `File: path:line` followed by numbered rows, no styling.
    pub fn to_plain_text(&self) -> String {
        let width = self.gutter_width();
        let mut out = format!("File: {}:{}\n", self.path, self.line_number);
        for line in &self.lines {
            let _ = write!(out, "{:>width$}:", line.number);
            if let Some(content) = &line.content
                && !content.is_empty()
            {
                let _ = write!(out, " {content}");
            }
            out.push('\n');
        }
        out
    }

    /// Same layout as [`to_plain_text`](Self::to_plain_text), styled for a
    /// terminal. Respects the global `colored` override.
    pub fn to_terminal_text(&self) -> String {
        let width = self.gutter_width();
        let mut out = format!(
            "{}:{}\n",
            self.path.bold(),
            self.line_number.to_string().dimmed()
        );
        for line in &self.lines {
            let gutter = format!("{:>width$}:", line.number);
            let _ = write!(out, "{}", gutter.dimmed());
            if !line.segments.is_empty() {
                out.push(' ');
            }
            for segment in &line.segments {
                if segment.highlighted {
                    let _ = write!(out, "{}", segment.text.yellow().bold());
                } else {
                    out.push_str(&segment.text);
                }
            }
            out.push('\n');
        }
        out
    }
}
