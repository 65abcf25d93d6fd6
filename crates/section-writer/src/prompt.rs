//! Request payload construction

use knowledge_index::SearchHit;

use crate::templates::{self, BASE_INSTRUCTIONS};

const RULE: &str = "============================================================";

/// Build the bounded request payload for one section
///
/// The payload combines the shared instructions, the section brief, the
/// dataset as pretty JSON and any reference excerpts, and is cut to at most
/// `max_chars` characters.
pub fn build_prompt(
    section_id: &str,
    title: &str,
    dataset: &serde_json::Value,
    references: &[SearchHit],
    max_chars: usize,
) -> String {
    let data = serde_json::to_string_pretty(dataset).unwrap_or_else(|_| dataset.to_string());

    let mut prompt = String::new();
    prompt.push_str(BASE_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(RULE);
    prompt.push_str("\nSPREADSHEET FIGURES:\n");
    prompt.push_str(&data);
    prompt.push('\n');

    if !references.is_empty() {
        prompt.push_str("\nREFERENCE EXCERPTS:\n");
        for hit in references {
            prompt.push_str(&format!(
                "[{} p.{}] {}\n",
                hit.chunk.source_id, hit.chunk.page_ref, hit.chunk.text
            ));
        }
    }

    prompt.push_str(RULE);
    prompt.push_str(&format!(
        "\nTASK: Write the \"{}\" section ({}).\n",
        title, section_id
    ));
    prompt.push_str(templates::instruction(section_id));
    prompt.push('\n');

    truncate_chars(prompt, max_chars)
}

/// Cut a string to at most `max_chars` characters without splitting one
pub fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
    }
    text
}
