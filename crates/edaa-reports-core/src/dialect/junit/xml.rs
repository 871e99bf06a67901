//! Minimal element tree on top of quick-xml.
//!
//! JUnit files are small enough to be held in memory completely; reading
//! them into a tree first keeps the dialect logic free of event handling.

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// An XML element with attributes, child elements and concatenated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
    /// Text content, whitespace preserved.
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Add the attribute only when a value is present.
    pub fn with_optional_attribute(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_attribute(key, value),
            None => self,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text with surrounding whitespace-only content treated as absent.
    pub fn text_content(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

/// Parse a complete document into its root element.
///
/// Errors are returned as messages including the byte position.
pub fn parse(content: &[u8]) -> Result<XmlElement, String> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(element_from(e)?),
            Ok(Event::Empty(ref e)) => attach(&mut stack, &mut root, element_from(e)?)?,
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without opening tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("invalid text at position {}: {err}", reader.buffer_position()))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err("text content outside of the root element".to_string()),
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                ));
            }
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of document inside <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("element name is not UTF-8: {e}"))?
        .to_string();
    let mut element = XmlElement::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute on <{}>: {e}", element.name))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("attribute name is not UTF-8: {e}"))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid value of attribute '{key}': {e}"))?
            .into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_some() => Err(format!("second root element <{}>", element.name)),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

/// Serialize a root element with XML declaration.
///
/// `indent` is the number of spaces per level; zero writes a single line.
pub fn write(root: &XmlElement, indent: usize) -> Result<Vec<u8>, String> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| format!("Write error: {e}"))?;
    write_element(&mut writer, root)?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    Ok(output)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| format!("Write error: {e}"));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| format!("Write error: {e}"))?;
    if !element.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(|e| format!("Write error: {e}"))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| format!("Write error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse(
            br#"<?xml version="1.0"?>
<testsuites name="all">
  <testsuite name="s1"><testcase name="a" classname="c"/></testsuite>
</testsuites>"#,
        )
        .unwrap();
        assert_eq!(root.name, "testsuites");
        assert_eq!(root.attribute("name"), Some("all"));
        let suite = root.children_named("testsuite").next().unwrap();
        assert_eq!(suite.children[0].attribute("classname"), Some("c"));
    }

    #[test]
    fn test_text_preserves_whitespace_and_entities() {
        let root = parse(b"<failure message=\"a &lt; b\">  line 1\n  line 2 &amp; more</failure>").unwrap();
        assert_eq!(root.attribute("message"), Some("a < b"));
        assert_eq!(root.text, "  line 1\n  line 2 & more");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"<a>").is_err());
        assert!(parse(b"").is_err());
        assert!(parse(b"<a/><b/>").is_err());
    }

    #[test]
    fn test_write_escapes_and_reparses() {
        let mut root = XmlElement::new("testsuite").with_attribute("name", "x<y");
        root.push(XmlElement::new("system-out").with_text("out & about"));
        let bytes = write(&root, 2).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("x&lt;y"));

        let reparsed = parse(&bytes).unwrap();
        assert_eq!(reparsed.attribute("name"), Some("x<y"));
        assert_eq!(reparsed.children[0].text, "out & about");
    }
}
