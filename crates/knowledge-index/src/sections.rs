//! Heading-based section extraction from reference pages

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chunk::{clean_text, PageText};

lazy_static! {
    static ref NUMBERED: Regex = Regex::new(r"^\d+\.").unwrap();
    static ref LABEL: Regex = Regex::new(r"^[A-Z][a-z]+:").unwrap();
    static ref CHAPTER_OR_SECTION: Regex = Regex::new(r"(?i)^(chapter|section)").unwrap();
}

/// A heading and the text that follows it up to the next heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub heading: String,
    /// Page on which the heading was found
    pub page: u32,
    pub content: String,
}

fn is_heading(fragment: &str) -> bool {
    let len = fragment.chars().count();
    if len <= 3 || len >= 100 {
        return false;
    }
    let has_letters = fragment.chars().any(char::is_alphabetic);
    let upper = has_letters && fragment == fragment.to_uppercase();

    upper
        || NUMBERED.is_match(fragment)
        || LABEL.is_match(fragment)
        || CHAPTER_OR_SECTION.is_match(fragment)
}

/// Group page text into sections keyed by detected headings
///
/// Page text is cleaned and split on full stops. Text before the first
/// heading is not attributed to any section.
pub fn extract_sections(pages: &[PageText]) -> Vec<DocumentSection> {
    let mut sections = Vec::new();
    let mut current: Option<(DocumentSection, Vec<String>)> = None;

    for page in pages {
        let cleaned = clean_text(&page.raw_text);
        for fragment in cleaned.split('.') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            if is_heading(fragment) {
                if let Some((section, body)) = current.take() {
                    sections.push(finish(section, body));
                }
                current = Some((
                    DocumentSection {
                        heading: fragment.to_string(),
                        page: page.page_number,
                        content: String::new(),
                    },
                    Vec::new(),
                ));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(fragment.to_string());
            }
        }
    }

    if let Some((section, body)) = current {
        sections.push(finish(section, body));
    }

    sections
}

fn finish(mut section: DocumentSection, body: Vec<String>) -> DocumentSection {
    section.content = body.join(" ").trim().to_string();
    section
}
