//! Fixed Typst template for generated sections
//!
//! Expects `sys.inputs` of the form
//! `{"title": str, "blocks": [{"kind": "paragraph" | "heading" | "table", ...}]}`.

pub const SECTION_TEMPLATE: &str = r#"#let data = sys.inputs

#set document(title: data.title)
#set page(
  paper: "a4",
  margin: (top: 30mm, bottom: 30mm, left: 25mm, right: 25mm),
  footer: context align(center, text(size: 9pt, counter(page).display())),
)
#set text(size: 11pt)
#set par(justify: true)
#show heading.where(level: 1): set text(size: 18pt)
#show heading.where(level: 2): set text(size: 13pt)

#heading(level: 1, data.title)

#for item in data.blocks {
  if item.kind == "heading" {
    heading(level: 2, item.text)
  } else if item.kind == "table" {
    v(0.6em)
    text(weight: "bold", item.title)
    table(
      columns: item.header.len(),
      stroke: 0.5pt + luma(110),
      inset: 6pt,
      fill: (x, y) => if y == 0 { luma(225) },
      table.header(..item.header.map(cell => text(weight: "bold", cell))),
      ..item.rows.flatten(),
    )
    v(0.6em)
  } else {
    par(item.text)
    parbreak()
  }
}
"#;
