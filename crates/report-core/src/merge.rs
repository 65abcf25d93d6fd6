//! Artifact merge with blank-page removal
//!
//! Every page of every artifact is imported into a fresh document whose
//! page tree lists only the retained pages, in artifact order. A page is
//! retained when its content stream shows non-whitespace text.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::artifact::PageArtifact;
use crate::error::AssemblyError;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page tree walks
const MAX_TREE_DEPTH: usize = 64;

/// Bound on nested form XObjects followed from one page
const MAX_FORM_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub document: Vec<u8>,
    pub page_count: usize,
    pub pages_inspected: usize,
    pub pages_dropped: usize,
    /// Labels of artifacts whose bytes could not be parsed as PDF
    pub unreadable: Vec<String>,
}

/// Merge artifacts in order, optionally dropping pages without text
///
/// Zero-content artifacts contribute nothing. Fails with
/// [`AssemblyError::EmptyDocument`] when no page is retained.
pub fn merge_artifacts(
    artifacts: &[PageArtifact],
    drop_blank_pages: bool,
) -> Result<MergeOutcome, AssemblyError> {
    let mut dest = Document::with_version("1.7");
    let pages_id = dest.new_object_id();

    let mut kept: Vec<ObjectId> = Vec::new();
    let mut pages_inspected = 0;
    let mut pages_dropped = 0;
    let mut unreadable = Vec::new();

    for artifact in artifacts.iter().filter(|a| a.has_content) {
        let mut source = match Document::load_mem(&artifact.bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(label = %artifact.label, "skipping unreadable PDF: {}", e);
                unreadable.push(artifact.label.clone());
                continue;
            }
        };

        let mut retained = Vec::new();
        for (page_number, page_id) in source.get_pages() {
            pages_inspected += 1;
            if drop_blank_pages && !page_has_text(&source, page_id) {
                tracing::warn!(label = %artifact.label, page = page_number, "dropping blank page");
                pages_dropped += 1;
                continue;
            }
            retained.push(page_id);
        }

        for &page_id in &retained {
            inherit_attributes(&mut source, page_id);
        }

        let id_offset = dest.max_id;
        for (old_id, object) in std::mem::take(&mut source.objects) {
            dest.objects
                .insert((old_id.0 + id_offset, old_id.1), remap_object_refs(object, id_offset));
        }
        dest.max_id = dest.max_id.max(source.max_id + id_offset);

        kept.extend(retained.into_iter().map(|id| (id.0 + id_offset, id.1)));
    }

    if kept.is_empty() {
        return Err(AssemblyError::EmptyDocument);
    }

    for page_id in &kept {
        let page = dest.get_dictionary_mut(*page_id).map_err(|e| {
            AssemblyError::Merge(format!("page {:?} is not a dictionary: {}", page_id, e))
        })?;
        page.set("Parent", Object::Reference(pages_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set(
        "Kids",
        Object::Array(kept.iter().map(|&id| Object::Reference(id)).collect()),
    );
    pages_dict.set("Count", Object::Integer(kept.len() as i64));
    dest.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = dest.add_object(Object::Dictionary(catalog));
    dest.trailer.set("Root", Object::Reference(catalog_id));

    dest.prune_objects();
    dest.compress();

    let mut document = Vec::new();
    dest.save_to(&mut document)
        .map_err(|e| AssemblyError::Merge(format!("Failed to save merged PDF: {}", e)))?;

    tracing::info!(
        pages = kept.len(),
        dropped = pages_dropped,
        bytes = document.len(),
        "merged report"
    );

    Ok(MergeOutcome {
        document,
        page_count: kept.len(),
        pages_inspected,
        pages_dropped,
        unreadable,
    })
}

/// Whether a page shows any non-whitespace text
///
/// Text drawn inside form XObjects invoked with `Do` counts as well.
pub fn page_has_text(doc: &Document, page_id: ObjectId) -> bool {
    let bytes = match doc.get_page_content(page_id) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(?page_id, "unreadable page content: {}", e);
            return false;
        }
    };
    let mut visited = BTreeSet::new();
    content_has_text(doc, &bytes, page_resources(doc, page_id), &mut visited, 0)
}

fn content_has_text<'a>(
    doc: &'a Document,
    bytes: &[u8],
    resources: Option<&'a Dictionary>,
    visited: &mut BTreeSet<ObjectId>,
    depth: usize,
) -> bool {
    let content = match Content::decode(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(depth, "undecodable content stream: {}", e);
            return false;
        }
    };

    content.operations.iter().any(|op| match op.operator.as_str() {
        "Tj" | "'" | "\"" => op.operands.last().map(is_visible_string).unwrap_or(false),
        "TJ" => op
            .operands
            .first()
            .and_then(|o| o.as_array().ok())
            .map(|items| items.iter().any(is_visible_string))
            .unwrap_or(false),
        "Do" if depth < MAX_FORM_DEPTH => op
            .operands
            .first()
            .and_then(|o| o.as_name().ok())
            .map(|name| form_has_text(doc, name, resources, visited, depth))
            .unwrap_or(false),
        _ => false,
    })
}

/// Follow a `Do` operand into its form XObject
///
/// Image XObjects and unresolvable names show no text. Each form is
/// visited at most once per page.
fn form_has_text<'a>(
    doc: &'a Document,
    name: &[u8],
    resources: Option<&'a Dictionary>,
    visited: &mut BTreeSet<ObjectId>,
    depth: usize,
) -> bool {
    let Some(form_id) = resources
        .and_then(|r| r.get(b"XObject").ok())
        .and_then(|x| resolve_dict(doc, x))
        .and_then(|x| x.get(name).ok())
        .and_then(|o| o.as_reference().ok())
    else {
        return false;
    };
    if !visited.insert(form_id) {
        return false;
    }

    let Ok(Object::Stream(stream)) = doc.get_object(form_id) else {
        return false;
    };
    let is_form = stream
        .dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .map(|subtype| subtype == b"Form")
        .unwrap_or(false);
    if !is_form {
        return false;
    }

    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let form_resources = stream
        .dict
        .get(b"Resources")
        .ok()
        .and_then(|r| resolve_dict(doc, r))
        .or(resources);
    content_has_text(doc, &bytes, form_resources, visited, depth + 1)
}

/// The page's resource dictionary, inherited from the page tree if needed
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn is_visible_string(obj: &Object) -> bool {
    matches!(obj, Object::String(bytes, _) if bytes.iter().any(|b| !b.is_ascii_whitespace()))
}

/// Copy inherited page attributes onto the page itself
///
/// The page is re-parented under the merged page tree, so anything it used
/// to inherit from its old ancestors must live on the page.
fn inherit_attributes(doc: &mut Document, page_id: ObjectId) {
    let mut inherited: BTreeMap<&[u8], Object> = BTreeMap::new();

    if let Ok(page) = doc.get_dictionary(page_id) {
        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }
            let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;
            while let Some(node_id) = parent {
                let Ok(node) = doc.get_dictionary(node_id) else {
                    break;
                };
                if let Ok(value) = node.get(key) {
                    inherited.insert(key, value.clone());
                    break;
                }
                depth += 1;
                if depth > MAX_TREE_DEPTH {
                    break;
                }
                parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            }
        }
    }

    if inherited.is_empty() {
        return;
    }
    if let Ok(page) = doc.get_dictionary_mut(page_id) {
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
}

fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}
