//! MediaWiki XML export dump

use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use sxd_document::dom::{Document, Element};
use sxd_document::writer::format_document;
use sxd_document::Package;
use tracing::debug;

use super::DocSink;
use crate::error::SinkError;
use crate::model::{Event, Function, Script};
use crate::render::{member_title, script_title, Renderer};

const EXPORT_NS: &str = "http://www.mediawiki.org/xml/export-0.11/";
const SCHEMA_LOCATION: &str =
    "http://www.mediawiki.org/xml/export-0.11/ http://www.mediawiki.org/xml/export-0.11.xsd";

/// Site metadata written to the `<siteinfo>` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSiteInfo {
    pub site_name: String,
    pub db_name: String,
    pub base_url: String,
    /// Username recorded on every revision
    pub contributor: String,
    pub generator: String,
}

impl Default for XmlSiteInfo {
    fn default() -> Self {
        Self {
            site_name: "PapyrusDocs".to_string(),
            db_name: "papyrus_wiki".to_string(),
            base_url: "http://localhost/wiki/Main_Page".to_string(),
            contributor: "Quill".to_string(),
            generator: format!("quill {}", crate::VERSION),
        }
    }
}

impl XmlSiteInfo {
    /// Namespace table, keyed by namespace number
    fn namespaces(&self) -> Vec<(i32, String)> {
        let fixed = |key: i32, name: &str| (key, name.to_string());
        vec![
            fixed(-2, "Media"),
            fixed(-1, "Special"),
            fixed(0, ""),
            fixed(1, "Talk"),
            fixed(2, "User"),
            fixed(3, "User talk"),
            (4, self.site_name.clone()),
            (5, format!("{} talk", self.site_name)),
            fixed(6, "File"),
            fixed(7, "File talk"),
            fixed(8, "MediaWiki"),
            fixed(9, "MediaWiki talk"),
            fixed(10, "Template"),
            fixed(11, "Template talk"),
            fixed(12, "Help"),
            fixed(13, "Help talk"),
            fixed(14, "Category"),
            fixed(15, "Category talk"),
        ]
    }
}

/// Lowercase hex SHA-1 of the UTF-8 text
pub fn text_digest(text: &str) -> String {
    hex::encode(Sha1::digest(text.as_bytes()))
}

struct PageRecord {
    title: String,
    text: String,
}

/// Builds a MediaWiki import document with one `<page>` per written page.
///
/// Page and revision ids count up from 1 in write order. All revisions
/// share one timestamp, taken when the sink is created unless set
/// explicitly.
pub struct XmlDumpSink {
    renderer: Renderer,
    site: XmlSiteInfo,
    timestamp: DateTime<Utc>,
    pages: Vec<PageRecord>,
    output: Option<Vec<u8>>,
}

impl XmlDumpSink {
    pub fn new(renderer: Renderer, site: XmlSiteInfo) -> Self {
        Self {
            renderer,
            site,
            timestamp: Utc::now(),
            pages: Vec::new(),
            output: None,
        }
    }

    /// Fix the revision timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn site(&self) -> &XmlSiteInfo {
        &self.site
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialized document, available once finalized
    pub fn bytes(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    /// Finalize and take the serialized document.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, SinkError> {
        self.finalize()?;
        Ok(self.output.take().unwrap_or_default())
    }

    fn add_page(&mut self, title: String, text: String) -> Result<(), SinkError> {
        if self.output.is_some() {
            return Err(SinkError::AlreadyFinalized { sink: "xml" });
        }
        self.pages.push(PageRecord { title, text });
        Ok(())
    }

    fn build(&self) -> Result<Vec<u8>, SinkError> {
        let package = Package::new();
        let doc = package.as_document();

        let root = doc.create_element("mediawiki");
        root.set_attribute_value("xmlns", EXPORT_NS);
        root.set_attribute_value("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance");
        root.set_attribute_value("xsi:schemaLocation", SCHEMA_LOCATION);
        root.set_attribute_value("version", "0.11");
        root.set_attribute_value("xml:lang", "en");
        doc.root().append_child(root);

        self.write_siteinfo(&doc, root);

        let timestamp = self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        for (index, record) in self.pages.iter().enumerate() {
            let id = (index + 1).to_string();
            let page = append(&doc, root, "page");
            append_text(&doc, page, "title", &record.title);
            append_text(&doc, page, "ns", "0");
            append_text(&doc, page, "id", &id);

            let revision = append(&doc, page, "revision");
            append_text(&doc, revision, "id", &id);
            append_text(&doc, revision, "timestamp", &timestamp);
            let contributor = append(&doc, revision, "contributor");
            append_text(&doc, contributor, "username", &self.site.contributor);
            append_text(&doc, contributor, "id", "1");
            append_text(&doc, revision, "model", "wikitext");
            append_text(&doc, revision, "format", "text/x-wiki");

            let digest = text_digest(&record.text);
            let text = append_text(&doc, revision, "text", &record.text);
            text.set_attribute_value("bytes", &record.text.len().to_string());
            text.set_attribute_value("sha1", &digest);
            text.set_attribute_value("xml:space", "preserve");
            append_text(&doc, revision, "sha1", &digest);
        }

        let mut output = Vec::new();
        format_document(&doc, &mut output).map_err(SinkError::Xml)?;
        Ok(output)
    }

    fn write_siteinfo<'d>(&self, doc: &Document<'d>, root: Element<'d>) {
        let siteinfo = append(doc, root, "siteinfo");
        append_text(doc, siteinfo, "sitename", &self.site.site_name);
        append_text(doc, siteinfo, "dbname", &self.site.db_name);
        append_text(doc, siteinfo, "base", &self.site.base_url);
        append_text(doc, siteinfo, "generator", &self.site.generator);
        append_text(doc, siteinfo, "case", "first-letter");

        let namespaces = append(doc, siteinfo, "namespaces");
        for (key, name) in self.site.namespaces() {
            let namespace = append_text(doc, namespaces, "namespace", &name);
            namespace.set_attribute_value("key", &key.to_string());
            namespace.set_attribute_value("case", "first-letter");
        }
    }
}

fn append<'d>(doc: &Document<'d>, parent: Element<'d>, name: &str) -> Element<'d> {
    let element = doc.create_element(name);
    parent.append_child(element);
    element
}

fn append_text<'d>(doc: &Document<'d>, parent: Element<'d>, name: &str, text: &str) -> Element<'d> {
    let element = append(doc, parent, name);
    if !text.is_empty() {
        element.set_text(text);
    }
    element
}

impl DocSink for XmlDumpSink {
    fn kind(&self) -> &'static str {
        "xml"
    }

    fn write_script(&mut self, script: &Script) -> Result<(), SinkError> {
        let text = self.renderer.script_page(script);
        self.add_page(script_title(&script.name), text)
    }

    fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError> {
        let text = self.renderer.function_page(script_name, function);
        self.add_page(member_title(&function.name, script_name), text)
    }

    fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError> {
        let text = self.renderer.event_page(script_name, event);
        self.add_page(member_title(&event.name, script_name), text)
    }

    fn write_misc(&mut self, title: &str, text: &str) -> Result<(), SinkError> {
        self.add_page(title.to_string(), text.to_string())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        if self.output.is_some() {
            return Ok(());
        }
        let output = self.build()?;
        debug!(pages = self.pages.len(), bytes = output.len(), "xml dump finished");
        self.output = Some(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::TypeLinkTable;
    use crate::render::{GenerationMarker, RenderOptions};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn sink() -> XmlDumpSink {
        let options = RenderOptions {
            marker: GenerationMarker::Off,
            ..RenderOptions::default()
        };
        let renderer = Renderer::new(options, Arc::new(TypeLinkTable::with_builtins()));
        XmlDumpSink::new(renderer, XmlSiteInfo::default())
            .with_timestamp(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 58).unwrap())
    }

    #[test]
    fn test_digest_of_known_text() {
        assert_eq!(text_digest(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(text_digest("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_document_shape() {
        let mut sink = sink();
        sink.write_script(&Script::new("Lamp", "ObjectReference")).unwrap();
        sink.write_misc("Category:Papyrus", "a < b & c").unwrap();
        let xml = String::from_utf8(sink.into_bytes().unwrap()).unwrap();

        assert!(xml.contains("<sitename>PapyrusDocs</sitename>"));
        assert!(xml.contains("<dbname>papyrus_wiki</dbname>"));
        assert!(xml.contains("<case>first-letter</case>"));
        assert!(xml.contains("PapyrusDocs talk</namespace>"));
        assert!(xml.contains("<title>Lamp Script</title>"));
        assert!(xml.contains("<title>Category:Papyrus</title>"));
        assert!(xml.contains("<timestamp>2024-12-31T23:59:58Z</timestamp>"));
        assert!(xml.contains("<username>Quill</username>"));
        assert!(xml.contains("<model>wikitext</model><format>text/x-wiki</format>"));
        assert!(xml.contains("a &lt; b &amp; c</text>"));
        assert!(xml.contains(&format!("<sha1>{}</sha1>", text_digest("a < b & c"))));
        assert_eq!(xml.matches("<page>").count(), 2);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut sink = sink();
        sink.write_misc("Readme", "hi").unwrap();
        sink.finalize().unwrap();
        let first = sink.bytes().unwrap().to_vec();
        sink.finalize().unwrap();
        assert_eq!(sink.bytes().unwrap(), first.as_slice());
        assert!(matches!(
            sink.write_misc("Late", "x"),
            Err(SinkError::AlreadyFinalized { sink: "xml" })
        ));
    }

    #[test]
    fn test_custom_site_namespace() {
        let site = XmlSiteInfo {
            site_name: "Starbase".to_string(),
            ..XmlSiteInfo::default()
        };
        let renderer = Renderer::new(RenderOptions::default(), Arc::new(TypeLinkTable::new()));
        let xml = XmlDumpSink::new(renderer, site).into_bytes().unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(">Starbase</namespace>"));
        assert!(xml.contains(">Starbase talk</namespace>"));
        assert!(!xml.contains("<page>"));
    }
}
