//! Structured documentation comment parser.
//!
//! Reads one documentation file (`doc > assembly > name`, `doc > members >
//! member[name]*`) into comment nodes keyed by canonical ID. Only a fixed set
//! of elements is understood; anything else is dropped with a warning and
//! parsing continues.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::error::Error;
use crate::types::CanonicalId;

/// Separator placed between a content node's text and its paragraphs.
const LINE_BREAK: &str = "<br>";

/// The recognized comment elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    /// `exception[cref]`.
    Exception,
    /// `para`, inside summary or other content.
    Para,
    /// `param[name]`.
    Param,
    /// `remarks`, nested in summary or at member level.
    Remarks,
    /// `returns`.
    Returns,
    /// `summary`.
    Summary,
    /// `typeparam[name]`.
    TypeParam,
}

impl Element {
    /// Map a tag name to a recognized element.
    fn from_tag(tag: &str) -> Option<Self> {
        return match tag {
            "exception" => Some(Element::Exception),
            "para" => Some(Element::Para),
            "param" => Some(Element::Param),
            "remarks" => Some(Element::Remarks),
            "returns" => Some(Element::Returns),
            "summary" => Some(Element::Summary),
            "typeparam" => Some(Element::TypeParam),
            _ => None,
        };
    }
}

/// Parsed documentation for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentNode {
    /// Exception docs in source order, keyed by `cref`.
    pub exceptions: Vec<NamedDoc>,
    /// Parameter docs in source order.
    pub params: Vec<NamedDoc>,
    /// Return value doc.
    pub returns: Option<String>,
    /// Summary block.
    pub summary: Option<Summary>,
    /// Type parameter docs in source order.
    pub type_params: Vec<NamedDoc>,
}

impl CommentNode {
    /// Doc text for the parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        return find_named(&self.params, name);
    }

    /// Doc text for the type parameter called `name`.
    pub fn type_param(&self, name: &str) -> Option<&str> {
        return find_named(&self.type_params, name);
    }

    /// Summary text with paragraphs appended, `None` when empty.
    pub fn summary_text(&self) -> Option<String> {
        let summary = self.summary.as_ref()?;
        let joined = join_content(&summary.text, &summary.paras);
        if joined.is_empty() {
            return None;
        }
        return Some(joined);
    }
}

/// Look up a named doc entry.
fn find_named<'a>(docs: &'a [NamedDoc], name: &str) -> Option<&'a str> {
    return docs.iter().find(|d| return d.name == name).map(|d| return d.text.as_str());
}

/// Documentation file contents.
#[derive(Debug, Default)]
pub struct DocFile {
    /// Assembly name declared in the file, if any.
    pub assembly: Option<String>,
    /// Number of unrecognized elements that were dropped.
    pub ignored: usize,
    /// Member comments in file order.
    pub members: Vec<(CanonicalId, CommentNode)>,
}

/// Doc text attached to a name (parameter, type parameter, exception cref).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDoc {
    /// Parameter name or exception `cref`.
    pub name: String,
    /// Doc text.
    pub text: String,
}

/// The summary block: raw text, paragraphs, and nested remarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Paragraph texts in source order.
    pub paras: Vec<String>,
    /// Remarks nested in the summary or given at member level.
    pub remarks: Option<String>,
    /// Raw text directly inside the summary, whitespace-normalized.
    pub text: String,
}

// ── Index ─────────────────────────────────────────────────────────────

/// Every parsed comment of one generation run, keyed by canonical ID.
#[derive(Debug, Default)]
pub struct CommentIndex {
    /// Member comments.
    entries: HashMap<CanonicalId, CommentNode>,
}

impl CommentIndex {
    /// Merge a parsed file. The first comment for an ID wins; later
    /// duplicates are reported and dropped. Returns the duplicate count.
    pub fn insert_file(&mut self, file: &Path, doc: DocFile) -> usize {
        let mut duplicates = 0_usize;
        for (id, node) in doc.members {
            if self.entries.contains_key(&id) {
                warn!(file = %file.display(), id = %id, "duplicate comment id, keeping the first");
                duplicates = duplicates.saturating_add(1);
                continue;
            }
            self.entries.insert(id, node);
        }
        return duplicates;
    }

    /// Comment for `id`, if the documentation files had one.
    pub fn get(&self, id: &CanonicalId) -> Option<&CommentNode> {
        return self.entries.get(id);
    }

    /// Number of indexed comments.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }
}

// ── Parser ────────────────────────────────────────────────────────────

/// One step of the pull parser, with irrelevant events already dropped.
enum Step {
    /// End of the current element.
    Close,
    /// End of input.
    Eof,
    /// A child element opens.
    Open {
        /// Attribute name/value pairs.
        attrs: Vec<(String, String)>,
        /// Self-closing tag: no matching close step follows.
        empty: bool,
        /// Tag name.
        tag: String,
    },
    /// Character data, entities already resolved.
    Text(String),
}

/// Recursive-descent parser over quick-xml's event stream.
struct Parser<'a> {
    /// File being parsed, for diagnostics.
    file: &'a Path,
    /// Count of dropped elements.
    ignored: usize,
    /// Event source.
    reader: Reader<&'a [u8]>,
}

/// Parse one documentation file.
///
/// # Errors
///
/// Returns `Error::MalformedDocument` if the XML does not parse, ends early,
/// or its root element is not `doc`.
pub fn parse(file: &Path, xml: &str) -> Result<DocFile, Error> {
    let mut parser = Parser { file, ignored: 0, reader: Reader::from_str(xml) };
    return parser.document();
}

/// Read and parse a documentation file from disk.
///
/// # Errors
///
/// Returns `Error::InputMissing` if the file is absent, `Error::Io` for
/// other read failures, or any error from [`parse`].
pub fn load(path: &Path) -> Result<DocFile, Error> {
    let xml = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::InputMissing {
                path: path.to_path_buf(),
                what: "documentation file".to_string(),
            });
        },
        Err(e) => return Err(Error::Io(e)),
    };
    return parse(path, &xml);
}

impl Parser<'_> {
    /// Build a `MalformedDocument` error for this file.
    fn malformed(&self, reason: impl Into<String>) -> Error {
        return Error::MalformedDocument { file: PathBuf::from(self.file), reason: reason.into() };
    }

    /// Pull the next meaningful step.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDocument` on any XML-level error.
    fn step(&mut self) -> Result<Step, Error> {
        loop {
            let event = self.reader.read_event().map_err(|e| return self.malformed(e.to_string()))?;
            match event {
                Event::Start(start) => return self.open(&start, false),
                Event::Empty(start) => return self.open(&start, true),
                Event::End(_) => return Ok(Step::Close),
                Event::Text(text) => {
                    let unescaped = text.unescape().map_err(|e| return self.malformed(e.to_string()))?;
                    return Ok(Step::Text(unescaped.into_owned()));
                },
                Event::CData(data) => {
                    let raw = std::str::from_utf8(&data).map_err(|e| return self.malformed(e.to_string()))?;
                    return Ok(Step::Text(raw.to_string()));
                },
                Event::Eof => return Ok(Step::Eof),
                Event::Comment(_) | Event::Decl(_) | Event::DocType(_) | Event::PI(_) => {},
            }
        }
    }

    /// Build an `Open` step from a start tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDocument` for undecodable names or attributes.
    fn open(&self, start: &BytesStart<'_>, empty: bool) -> Result<Step, Error> {
        let tag = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| return self.malformed(e.to_string()))?
            .to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| return self.malformed(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| return self.malformed(e.to_string()))?
                .to_string();
            let value = attr.unescape_value().map_err(|e| return self.malformed(e.to_string()))?;
            attrs.push((key, value.into_owned()));
        }
        return Ok(Step::Open { attrs, empty, tag });
    }

    /// Consume the rest of the current element, nested content included.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDocument` if input ends inside the element.
    fn skip(&mut self) -> Result<(), Error> {
        let mut depth = 1_usize;
        loop {
            match self.step()? {
                Step::Open { empty: false, .. } => depth = depth.saturating_add(1),
                Step::Close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                },
                Step::Eof => return Err(self.malformed("unexpected end of file")),
                Step::Open { .. } | Step::Text(_) => {},
            }
        }
    }

    /// Drop an unrecognized element, logging where it appeared.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDocument` if input ends inside the element.
    fn ignore(&mut self, tag: &str, parent: &str, empty: bool) -> Result<(), Error> {
        warn!(file = %self.file.display(), element = tag, parent, "unrecognized comment element dropped");
        self.ignored = self.ignored.saturating_add(1);
        if empty {
            return Ok(());
        }
        return self.skip();
    }

    /// Parse the whole file: prolog, `doc` root, and its children.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDocument` for a missing or unexpected root.
    fn document(&mut self) -> Result<DocFile, Error> {
        let mut doc = DocFile::default();
        loop {
            match self.step()? {
                Step::Open { tag, empty, .. } if tag == "doc" => {
                    if !empty {
                        self.doc_children(&mut doc)?;
                    }
                    doc.ignored = self.ignored;
                    return Ok(doc);
                },
                Step::Open { tag, .. } => {
                    return Err(self.malformed(format!("expected root element <doc>, found <{tag}>")));
                },
                Step::Text(text) if text.trim().is_empty() => {},
                Step::Text(_) => return Err(self.malformed("text before root element")),
                Step::Close => return Err(self.malformed("unbalanced end tag")),
                Step::Eof => return Err(self.malformed("no root element")),
            }
        }
    }

    /// Children of `doc`: `assembly` and `members`.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn doc_children(&mut self, doc: &mut DocFile) -> Result<(), Error> {
        loop {
            match self.step()? {
                Step::Open { tag, empty, .. } if tag == "assembly" => {
                    if !empty {
                        doc.assembly = self.assembly_name()?;
                    }
                },
                Step::Open { tag, empty, .. } if tag == "members" => {
                    if !empty {
                        self.members(doc)?;
                    }
                },
                Step::Open { tag, empty, .. } => self.ignore(&tag, "doc", empty)?,
                Step::Text(_) => {},
                Step::Close => return Ok(()),
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }
    }

    /// `assembly > name` text.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn assembly_name(&mut self) -> Result<Option<String>, Error> {
        let mut name = None;
        loop {
            match self.step()? {
                Step::Open { tag, empty, .. } if tag == "name" => {
                    if !empty {
                        let (text, _) = self.content("name")?;
                        name = Some(text);
                    }
                },
                Step::Open { tag, empty, .. } => self.ignore(&tag, "assembly", empty)?,
                Step::Text(_) => {},
                Step::Close => return Ok(name),
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }
    }

    /// `members > member*`.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn members(&mut self, doc: &mut DocFile) -> Result<(), Error> {
        loop {
            match self.step()? {
                Step::Open { tag, attrs, empty } if tag == "member" => {
                    let name = attr(&attrs, "name");
                    let node = if empty { CommentNode::default() } else { self.member()? };
                    match name {
                        Some(id) => doc.members.push((CanonicalId(id), node)),
                        None => {
                            warn!(file = %self.file.display(), "member without a name attribute dropped");
                            self.ignored = self.ignored.saturating_add(1);
                        },
                    }
                },
                Step::Open { tag, empty, .. } => self.ignore(&tag, "members", empty)?,
                Step::Text(_) => {},
                Step::Close => return Ok(()),
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }
    }

    /// One `member`: summary, params, type params, returns, exceptions.
    /// Bare text and paragraphs directly under the member count as summary.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn member(&mut self) -> Result<CommentNode, Error> {
        let mut node = CommentNode::default();
        let mut loose = String::new();
        let mut loose_paras = Vec::new();
        loop {
            match self.step()? {
                Step::Open { tag, attrs, empty } => match Element::from_tag(&tag) {
                    Some(element) => self.member_element(&mut node, &mut loose_paras, element, &attrs, empty)?,
                    None => self.ignore(&tag, "member", empty)?,
                },
                Step::Text(text) => push_text(&mut loose, &text),
                Step::Close => break,
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }

        let loose = normalize(&loose);
        if !loose.is_empty() || !loose_paras.is_empty() {
            let summary = node.summary.get_or_insert_with(Summary::default);
            if summary.text.is_empty() {
                summary.text = loose;
            } else if !loose.is_empty() {
                summary.text = format!("{} {loose}", summary.text);
            }
            summary.paras.extend(loose_paras);
        }
        return Ok(node);
    }

    /// Dispatch one recognized element directly under `member`.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn member_element(
        &mut self,
        node: &mut CommentNode,
        loose_paras: &mut Vec<String>,
        element: Element,
        attrs: &[(String, String)],
        empty: bool,
    ) -> Result<(), Error> {
        if element == Element::Summary {
            let summary = if empty { Summary::default() } else { self.summary()? };
            node.summary = Some(merge_summary(node.summary.take(), summary));
            return Ok(());
        }

        let text = if empty { String::new() } else { self.content_text(element_tag(element))? };
        match element {
            Element::Exception => {
                let cref = attr(attrs, "cref").unwrap_or_default();
                node.exceptions.push(NamedDoc { name: cref, text });
            },
            Element::Para => loose_paras.push(text),
            Element::Param => {
                let name = attr(attrs, "name").unwrap_or_default();
                node.params.push(NamedDoc { name, text });
            },
            Element::Remarks => {
                node.summary.get_or_insert_with(Summary::default).remarks = Some(text);
            },
            Element::Returns => node.returns = Some(text),
            Element::TypeParam => {
                let name = attr(attrs, "name").unwrap_or_default();
                node.type_params.push(NamedDoc { name, text });
            },
            Element::Summary => {},
        }
        return Ok(());
    }

    /// `summary`: raw text, `para*`, and nested `remarks`. Paragraphs are kept
    /// apart from the raw text and rendered after it.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn summary(&mut self) -> Result<Summary, Error> {
        let mut raw = String::new();
        let mut summary = Summary::default();
        loop {
            match self.step()? {
                Step::Open { tag, empty, .. } => match Element::from_tag(&tag) {
                    Some(Element::Para) => {
                        if !empty {
                            summary.paras.push(self.content_text("para")?);
                        }
                    },
                    Some(Element::Remarks) => {
                        if !empty {
                            summary.remarks = Some(self.content_text("remarks")?);
                        }
                    },
                    _ => self.ignore(&tag, "summary", empty)?,
                },
                Step::Text(text) => push_text(&mut raw, &text),
                Step::Close => break,
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }
        summary.text = normalize(&raw);
        return Ok(summary);
    }

    /// Text content of a leaf element with paragraphs joined by line breaks.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn content_text(&mut self, parent: &str) -> Result<String, Error> {
        let (text, paras) = self.content(parent)?;
        return Ok(join_content(&text, &paras));
    }

    /// Raw text and nested paragraphs of a content element.
    ///
    /// # Errors
    ///
    /// Propagates parse errors.
    fn content(&mut self, parent: &str) -> Result<(String, Vec<String>), Error> {
        let mut raw = String::new();
        let mut paras = Vec::new();
        loop {
            match self.step()? {
                Step::Open { tag, empty, .. } if tag == "para" => {
                    if !empty {
                        paras.push(self.content_text("para")?);
                    }
                },
                Step::Open { tag, empty, .. } => self.ignore(&tag, parent, empty)?,
                Step::Text(text) => push_text(&mut raw, &text),
                Step::Close => return Ok((normalize(&raw), paras)),
                Step::Eof => return Err(self.malformed("unexpected end of file")),
            }
        }
    }
}

/// Tag name of a recognized element, for diagnostics.
const fn element_tag(element: Element) -> &'static str {
    return match element {
        Element::Exception => "exception",
        Element::Para => "para",
        Element::Param => "param",
        Element::Remarks => "remarks",
        Element::Returns => "returns",
        Element::Summary => "summary",
        Element::TypeParam => "typeparam",
    };
}

/// Value of attribute `key`.
fn attr(attrs: &[(String, String)], key: &str) -> Option<String> {
    return attrs.iter().find(|(k, _)| return k == key).map(|(_, v)| return v.clone());
}

/// Append a text chunk, keeping chunks apart by whitespace.
fn push_text(buffer: &mut String, chunk: &str) {
    buffer.push(' ');
    buffer.push_str(chunk);
}

/// Collapse runs of whitespace to single spaces and trim.
fn normalize(text: &str) -> String {
    return text.split_whitespace().collect::<Vec<_>>().join(" ");
}

/// `text<br>para<br>para`, skipping an empty text.
fn join_content(text: &str, paras: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !text.is_empty() {
        parts.push(text);
    }
    parts.extend(paras.iter().map(String::as_str).filter(|p| return !p.is_empty()));
    return parts.join(LINE_BREAK);
}

/// Combine a summary parsed earlier (e.g. from member-level remarks) with
/// the one from the `summary` element.
fn merge_summary(existing: Option<Summary>, parsed: Summary) -> Summary {
    let Some(mut existing) = existing else {
        return parsed;
    };
    existing.text = parsed.text;
    existing.paras.extend(parsed.paras);
    if parsed.remarks.is_some() {
        existing.remarks = parsed.remarks;
    }
    return existing;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(xml: &str) -> DocFile {
        parse(Path::new("Demo.xml"), xml).unwrap()
    }

    fn only_member(xml: &str) -> CommentNode {
        let doc = parse_str(&format!("<doc><members><member name=\"T:Demo.Box\">{xml}</member></members></doc>"));
        doc.members.into_iter().next().unwrap().1
    }

    #[test]
    fn reads_assembly_and_members() {
        let doc = parse_str(
            r#"<?xml version="1.0"?>
            <doc>
              <assembly><name>Demo</name></assembly>
              <members>
                <member name="T:Demo.Box"><summary>A box.</summary></member>
                <member name="M:Demo.Box.#ctor"><summary>Makes one.</summary></member>
              </members>
            </doc>"#,
        );
        assert_eq!(doc.assembly.as_deref(), Some("Demo"));
        let ids: Vec<&str> = doc.members.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["T:Demo.Box", "M:Demo.Box.#ctor"]);
    }

    #[test]
    fn summary_text_is_whitespace_normalized() {
        let node = only_member("<summary>\n   A   small\n   box.\n</summary>");
        assert_eq!(node.summary_text().as_deref(), Some("A small box."));
    }

    #[test]
    fn paragraphs_follow_raw_text_regardless_of_position() {
        let node = only_member("<summary><para>First.</para>Raw before? No, after.<para>Second.</para></summary>");
        let summary = node.summary.clone().unwrap();
        assert_eq!(summary.text, "Raw before? No, after.");
        assert_eq!(summary.paras, vec!["First.", "Second."]);
        assert_eq!(node.summary_text().as_deref(), Some("Raw before? No, after.<br>First.<br>Second."));
    }

    #[test]
    fn nested_remarks_are_kept_apart() {
        let node = only_member("<summary>Text.<remarks>Careful.</remarks></summary>");
        let summary = node.summary.unwrap();
        assert_eq!(summary.text, "Text.");
        assert_eq!(summary.remarks.as_deref(), Some("Careful."));
    }

    #[test]
    fn params_typeparams_returns_exceptions() {
        let node = only_member(
            r#"<param name="value">The value.</param>
               <typeparam name="T">Item type.</typeparam>
               <returns>The result.</returns>
               <exception cref="T:System.ArgumentNullException">When null.</exception>"#,
        );
        assert_eq!(node.param("value"), Some("The value."));
        assert_eq!(node.type_param("T"), Some("Item type."));
        assert_eq!(node.returns.as_deref(), Some("The result."));
        assert_eq!(node.exceptions, vec![NamedDoc {
            name: "T:System.ArgumentNullException".to_string(),
            text: "When null.".to_string(),
        }]);
    }

    #[test]
    fn unknown_elements_are_dropped_and_counted() {
        let doc = parse_str(
            r#"<doc><members><member name="T:Demo.Box">
                 <summary>Uses <see cref="T:Demo.Other"/> and <c>code</c> here.</summary>
                 <example><code>var b = new Box();</code></example>
               </member></members></doc>"#,
        );
        assert_eq!(doc.ignored, 3);
        let node = &doc.members.first().unwrap().1;
        assert_eq!(node.summary_text().as_deref(), Some("Uses and here."));
    }

    #[test]
    fn bare_member_text_becomes_summary() {
        let node = only_member("Just text.");
        assert_eq!(node.summary_text().as_deref(), Some("Just text."));
    }

    #[test]
    fn entities_are_unescaped() {
        let node = only_member("<summary>a &lt; b &amp;&amp; c</summary>");
        assert_eq!(node.summary_text().as_deref(), Some("a < b && c"));
    }

    #[test]
    fn wrong_root_is_malformed() {
        let err = parse(Path::new("Demo.xml"), "<project></project>").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn broken_xml_is_malformed() {
        let err = parse(Path::new("Demo.xml"), "<doc><members></doc>").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn index_keeps_first_duplicate() {
        let doc = parse_str(
            r#"<doc><members>
                 <member name="T:Demo.Box"><summary>First.</summary></member>
                 <member name="T:Demo.Box"><summary>Second.</summary></member>
               </members></doc>"#,
        );
        let mut index = CommentIndex::default();
        assert_eq!(index.insert_file(Path::new("Demo.xml"), doc), 1);
        assert_eq!(index.len(), 1);
        let node = index.get(&CanonicalId("T:Demo.Box".to_string())).unwrap();
        assert_eq!(node.summary_text().as_deref(), Some("First."));
    }
}
