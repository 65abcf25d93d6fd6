//! Shared fixtures: hand-built PDFs whose pages carry one identifying label

#![allow(dead_code)]

use std::cell::RefCell;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use report_core::SectionRenderer;
use section_render::RenderError;

/// Build a PDF where `Some(label)` pages show the label and `None` pages are blank
pub fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for page in pages {
        let operations = match page {
            Some(label) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(50), Object::Integer(700)]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![
                Operation::new("m", vec![Object::Integer(0), Object::Integer(0)]),
                Operation::new("l", vec![Object::Integer(100), Object::Integer(100)]),
                Operation::new("S", vec![]),
            ],
        };
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(pages.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The label shown on each page, in page order; blank pages give ""
pub fn page_labels(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|o| o.as_str().ok())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// Renders a section as a titled page followed by a blank separator page
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: RefCell<Vec<(String, String)>>,
    /// Titles that fail to render
    pub failing: Vec<String>,
}

impl FakeRenderer {
    pub fn failing_on(titles: &[&str]) -> Self {
        Self {
            calls: RefCell::default(),
            failing: titles.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl SectionRenderer for FakeRenderer {
    fn render_section(&self, title: &str, body: &str) -> Result<Vec<u8>, RenderError> {
        self.calls
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        if self.failing.iter().any(|t| t == title) {
            return Err(RenderError::Compile(vec!["forced failure".into()]));
        }
        Ok(pdf_with_pages(&[Some(title), None]))
    }
}
