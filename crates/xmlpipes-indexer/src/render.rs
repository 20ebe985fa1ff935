//! xmlpipe2 rendering.
//!
//! A document-set is a `sphinx:docset` whose first child embeds the schema,
//! followed by either documents or a single kill-list:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <sphinx:docset xmlns:sphinx="http://www.sphinxsearch.com">
//!   <sphinx:schema>
//!     <sphinx:field name="title"/>
//!     <sphinx:attr name="xmlpipes_class_crc" type="int" bits="32"/>
//!     <sphinx:attr name="volumes" type="int" bits="8" default="1"/>
//!   </sphinx:schema>
//!   <sphinx:document id="1">
//!     <title>Yotsuba&amp;!</title>
//!     <xmlpipes_class_crc>1809255439</xmlpipes_class_crc>
//!     <volumes>12</volumes>
//!   </sphinx:document>
//! </sphinx:docset>
//! ```
//!
//! Kill-lists replace the documents with
//! `<sphinx:killlist><id>1</id>…</sphinx:killlist>`.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use xmlpipes_core::{Document, Error, Index, Result, Source, Value};

/// Namespace of the xmlpipe2 vocabulary.
pub const SPHINX_NAMESPACE: &str = "http://www.sphinxsearch.com";

const DOCSET: &str = "sphinx:docset";

/// Streaming writer for one document-set.
pub struct DocsetWriter<'a, W: Write> {
    xml: Writer<W>,
    index: &'a Index,
}

impl<'a, W: Write> DocsetWriter<'a, W> {
    /// Start a document-set: XML declaration, root element, and the schema
    /// preamble with `source`'s defaults.
    pub fn begin(out: W, index: &'a Index, source: &Source) -> Result<Self> {
        let mut writer = Self {
            xml: Writer::new_with_indent(out, b' ', 2),
            index,
        };
        writer.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write(Event::Start(
            BytesStart::new(DOCSET).with_attributes([("xmlns:sphinx", SPHINX_NAMESPACE)]),
        ))?;
        writer.schema(source)?;
        Ok(writer)
    }

    fn schema(&mut self, source: &Source) -> Result<()> {
        self.write(Event::Start(BytesStart::new("sphinx:schema")))?;

        let index = self.index;
        for field in index.fields() {
            self.write(Event::Empty(
                BytesStart::new("sphinx:field").with_attributes([("name", field.name())]),
            ))?;
        }

        for attribute in index.attributes() {
            let mut element = BytesStart::new("sphinx:attr");
            element.push_attribute(("name", attribute.name()));
            element.push_attribute(("type", attribute.kind().as_str()));
            if let Some(bits) = attribute.bits() {
                element.push_attribute(("bits", bits.to_string().as_str()));
            }

            let default = match source.defaults().get(attribute.name()) {
                Some(raw) => Some(attribute.cast(raw)?),
                None => attribute.default_value().cloned(),
            };
            if let Some(default) = default {
                element.push_attribute(("default", format_value(&default).as_str()));
            }

            self.write(Event::Empty(element))?;
        }

        self.write(Event::End(BytesEnd::new("sphinx:schema")))
    }

    /// Append one document. Fields and attributes the document has no value
    /// for are omitted; the class tag is always written.
    pub fn document(&mut self, document: &dyn Document) -> Result<()> {
        let id = document.document_id().to_string();
        self.write(Event::Start(
            BytesStart::new("sphinx:document").with_attributes([("id", id.as_str())]),
        ))?;

        let index = self.index;
        for field in index.fields() {
            if let Some(text) = document.field(field.name()) {
                self.text_element(field.name(), &text)?;
            }
        }

        for attribute in index.attributes() {
            let value = if attribute.is_class_tag() {
                Value::from(index.class_tag())
            } else {
                match document.attribute(attribute.name()) {
                    Some(raw) => attribute.cast(&raw)?,
                    None => continue,
                }
            };
            self.text_element(attribute.name(), &format_value(&value))?;
        }

        self.write(Event::End(BytesEnd::new("sphinx:document")))
    }

    /// Append a kill-list of document ids.
    pub fn killlist(&mut self, ids: &[u64]) -> Result<()> {
        self.write(Event::Start(BytesStart::new("sphinx:killlist")))?;
        for id in ids {
            self.text_element("id", &id.to_string())?;
        }
        self.write(Event::End(BytesEnd::new("sphinx:killlist")))
    }

    /// Close the document-set and hand back the output.
    pub fn finish(mut self) -> Result<W> {
        self.write(Event::End(BytesEnd::new(DOCSET)))?;
        let mut out = self.xml.into_inner();
        out.write_all(b"\n").map_err(Error::xml)?;
        Ok(out)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.xml.write_event(event).map_err(Error::xml)
    }
}

/// Text form of a cast value. Floats always carry a fractional part.
fn format_value(value: &Value) -> String {
    match value {
        Value::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{v:.1}"),
        other => other.to_string(),
    }
}

/// Render a complete document-set into a byte buffer.
pub fn render_documents<'d, I>(index: &Index, source: &Source, documents: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'d dyn Document>,
{
    let mut writer = DocsetWriter::begin(Vec::new(), index, source)?;
    for document in documents {
        writer.document(document)?;
    }
    writer.finish()
}

/// Render a complete kill-list document-set into a byte buffer.
pub fn render_killlist(index: &Index, source: &Source, ids: &[u64]) -> Result<Vec<u8>> {
    let mut writer = DocsetWriter::begin(Vec::new(), index, source)?;
    writer.killlist(ids)?;
    writer.finish()
}

// ============================================================================
// Tests
// ============================================================================
