//! Block model for generated section text
//!
//! Section bodies are plain text with two conventions: `#` subheadings and
//! tables delimited by `[TABLE:Title]` / `[/TABLE]` whose rows are
//! pipe-separated, the first row being the header.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref TABLE_START: Regex = Regex::new(r"(?i)^\[TABLE:\s*(.*?)\s*\]$").unwrap();
    static ref TABLE_END: Regex = Regex::new(r"(?i)^\[/TABLE\]$").unwrap();
    static ref HEADING: Regex = Regex::new(r"^#{1,6}\s*(.+)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
    },
    Heading {
        text: String,
    },
    /// Every row, header included, has the same number of cells
    Table {
        title: String,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Remove `**` emphasis markers
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}

/// Split a section body into renderable blocks
///
/// Consecutive non-empty lines form one paragraph. An unterminated table
/// runs to the end of the body; a table with no rows is dropped.
pub fn parse_blocks(body: &str) -> Vec<Block> {
    let body = strip_emphasis(body);
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut table: Option<(String, Vec<Vec<String>>)> = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();

        if let Some((_, rows)) = table.as_mut() {
            if TABLE_END.is_match(line) {
                if let Some((title, rows)) = table.take() {
                    push_table(&mut blocks, title, rows);
                }
            } else if !line.is_empty() {
                rows.push(split_row(line));
            }
            continue;
        }

        if let Some(caps) = TABLE_START.captures(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            table = Some((caps[1].to_string(), Vec::new()));
        } else if let Some(caps) = HEADING.captures(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            blocks.push(Block::Heading {
                text: caps[1].trim().to_string(),
            });
        } else if line.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
        } else {
            paragraph.push(line);
        }
    }

    if let Some((title, rows)) = table.take() {
        push_table(&mut blocks, title, rows);
    }
    flush_paragraph(&mut blocks, &mut paragraph);

    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, lines: &mut Vec<&str>) {
    if !lines.is_empty() {
        blocks.push(Block::Paragraph {
            text: lines.join(" "),
        });
        lines.clear();
    }
}

fn split_row(line: &str) -> Vec<String> {
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn push_table(blocks: &mut Vec<Block>, title: String, mut rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        tracing::debug!(%title, "dropping table without rows");
        return;
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(1);
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let header = rows.remove(0);
    blocks.push(Block::Table {
        title,
        header,
        rows,
    });
}
