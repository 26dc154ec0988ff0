//! Literal lexical forms: XML literal capture and canonical typed values

use std::collections::BTreeMap;

use super::context::EvalContext;
use crate::rdf::vocab::{XML_NS, XSD_NS};
use crate::xml::{QualifiedName, XmlContent, XmlNode};

/// Serialize the content of a `rdf:parseType="Literal"` element
///
/// Each element declares the namespaces its own name and attributes use,
/// unless an enclosing literal element already declared the same binding.
/// Top-level elements get an `xml:lang` when a language is active and they do
/// not set one. Attributes are sorted, empty elements are expanded and
/// comments are dropped.
pub(crate) fn xml_literal<N: XmlNode>(element: &N, ctx: &EvalContext) -> String {
    let mut out = String::new();
    let rendered = BTreeMap::new();
    for child in element.children() {
        match child {
            XmlContent::Element(child) => {
                let language = ctx
                    .language
                    .as_deref()
                    .filter(|_| child.attribute(XML_NS, "lang").is_none());
                write_element(&mut out, &child, &rendered, language);
            }
            XmlContent::Text(text) => escape_text(&mut out, &text),
            XmlContent::Comment(_) => {}
        }
    }
    out
}

/// Prefix → namespace pairs visibly used by an element, `""` for the default
fn used_namespaces<N: XmlNode>(element: &N) -> Vec<(String, String)> {
    let name = element.name();
    let mut used = vec![(
        name.prefix.clone().unwrap_or_default(),
        name.namespace.clone().unwrap_or_default(),
    )];
    for attribute in element.attributes() {
        if let (Some(prefix), Some(namespace)) = (&attribute.name.prefix, &attribute.name.namespace) {
            used.push((prefix.clone(), namespace.clone()));
        }
    }
    used.retain(|(prefix, _)| prefix != "xml");
    used
}

fn write_element<N: XmlNode>(
    out: &mut String,
    element: &N,
    rendered: &BTreeMap<String, String>,
    language: Option<&str>,
) {
    let mut scope = rendered.clone();
    let mut declarations = BTreeMap::new();
    for (prefix, namespace) in used_namespaces(element) {
        let current = scope.get(&prefix).map(String::as_str).unwrap_or("");
        if current != namespace {
            declarations.insert(prefix.clone(), namespace.clone());
            scope.insert(prefix, namespace);
        }
    }

    let name = element.name().to_string();
    out.push('<');
    out.push_str(&name);

    for (prefix, namespace) in &declarations {
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
        }
        escape_attribute(out, namespace);
        out.push('"');
    }

    let lang_name = QualifiedName::new(Some(XML_NS.to_string()), "lang", Some("xml".to_string()));
    let mut attributes: Vec<(&QualifiedName, &str)> = element
        .attributes()
        .iter()
        .map(|attribute| (&attribute.name, attribute.value.as_str()))
        .collect();
    attributes.sort_by(|(a, _), (b, _)| {
        (a.namespace.as_deref().unwrap_or(""), &a.local)
            .cmp(&(b.namespace.as_deref().unwrap_or(""), &b.local))
    });
    if let Some(language) = language {
        let position = attributes
            .iter()
            .position(|(name, _)| {
                (name.namespace.as_deref().unwrap_or(""), name.local.as_str()) > (XML_NS, "lang")
            })
            .unwrap_or(attributes.len());
        attributes.insert(position, (&lang_name, language));
    }
    for (attribute, value) in attributes {
        out.push(' ');
        out.push_str(&attribute.to_string());
        out.push_str("=\"");
        escape_attribute(out, value);
        out.push('"');
    }
    out.push('>');

    for child in element.children() {
        match child {
            XmlContent::Element(child) => write_element(out, &child, &scope, None),
            XmlContent::Text(text) => escape_text(out, &text),
            XmlContent::Comment(_) => {}
        }
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

const INTEGER_TYPES: [&str; 13] = [
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "nonPositiveInteger",
    "negativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

/// Canonical lexical form for the XSD types with an obvious one;
/// anything unrecognized or malformed is returned unchanged
pub(crate) fn canonical_form(value: &str, datatype: &str) -> String {
    let Some(local) = datatype.strip_prefix(XSD_NS) else {
        return value.to_string();
    };
    let trimmed = value.trim();
    let canonical = match local {
        "boolean" => match trimmed {
            "true" | "1" => Some("true".to_string()),
            "false" | "0" => Some("false".to_string()),
            _ => None,
        },
        "decimal" => canonical_decimal(trimmed),
        local if INTEGER_TYPES.contains(&local) => canonical_integer(trimmed),
        _ => None,
    };
    canonical.unwrap_or_else(|| value.to_string())
}

fn split_sign(value: &str) -> (bool, &str) {
    match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    }
}

fn canonical_integer(value: &str) -> Option<String> {
    let (negative, digits) = split_sign(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    Some(match (negative, digits.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    })
}

fn canonical_decimal(value: &str) -> Option<String> {
    let (negative, unsigned) = split_sign(value);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let frac_part = match frac_part.trim_end_matches('0') {
        "" => "0",
        digits => digits,
    };
    let zero = int_part == "0" && frac_part == "0";
    let sign = if negative && !zero { "-" } else { "" };
    Some(format!("{}{}.{}", sign, int_part, frac_part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;
    use std::rc::Rc;

    fn literal_of(input: &str, language: Option<&str>) -> String {
        let doc = Document::parse(input).unwrap();
        let root = doc.root().unwrap();
        let mut ctx = EvalContext::new(None);
        ctx.language = language.map(str::to_string);
        ctx.namespaces = Rc::new(
            root.namespace_declarations()
                .iter()
                .cloned()
                .collect(),
        );
        xml_literal(&root, &ctx)
    }

    #[test]
    fn test_xml_literal_declares_namespaces() {
        let markup = literal_of(
            r#"<ex:p xmlns:ex="http://example.org/" xmlns="http://www.w3.org/1999/xhtml">a <b z="1" a="2">bold<br/></b><!-- gone --></ex:p>"#,
            None,
        );
        assert_eq!(
            markup,
            r#"a <b xmlns="http://www.w3.org/1999/xhtml" a="2" z="1">bold<br></br></b>"#
        );
    }

    #[test]
    fn test_xml_literal_declares_only_used_namespaces() {
        let markup = literal_of(
            r#"<ex:p xmlns:ex="http://example.org/" xmlns:dc="http://purl.org/dc/terms/"><ex:a dc:x="1"><ex:b/><c xmlns="http://example.com/"><d xmlns=""/></c></ex:a><e/></ex:p>"#,
            None,
        );
        assert_eq!(
            markup,
            concat!(
                r#"<ex:a xmlns:dc="http://purl.org/dc/terms/" xmlns:ex="http://example.org/" dc:x="1">"#,
                r#"<ex:b></ex:b><c xmlns="http://example.com/"><d xmlns=""></d></c></ex:a><e></e>"#
            )
        );
    }

    #[test]
    fn test_xml_literal_is_stable_when_reparsed() {
        let first = literal_of(
            r#"<ex:p xmlns:ex="http://example.org/" xmlns:ns0="http://example.org/"><b>x</b> and <ex:i>y</ex:i></ex:p>"#,
            None,
        );
        assert_eq!(first, r#"<b>x</b> and <ex:i xmlns:ex="http://example.org/">y</ex:i>"#);

        let captured = literal_of(&format!(r#"<body xmlns="http://example.org/">{}</body>"#, first), None);
        assert!(captured.starts_with(r#"<b xmlns="http://example.org/">x</b>"#));

        let reset = format!(r#"<ex:body xmlns:ex="http://example.org/" xmlns="">{}</ex:body>"#, first);
        assert_eq!(literal_of(&reset, None), first);
    }

    #[test]
    fn test_xml_literal_inherits_language() {
        let markup = literal_of(r#"<p><span>hi</span><span xml:lang="fr">salut</span></p>"#, Some("en"));
        assert_eq!(
            markup,
            r#"<span xml:lang="en">hi</span><span xml:lang="fr">salut</span>"#
        );
    }

    #[test]
    fn test_canonical_forms() {
        let xsd = |local: &str| format!("{}{}", XSD_NS, local);
        assert_eq!(canonical_form("1", &xsd("boolean")), "true");
        assert_eq!(canonical_form(" 007 ", &xsd("integer")), "7");
        assert_eq!(canonical_form("-000", &xsd("int")), "0");
        assert_eq!(canonical_form("+42", &xsd("long")), "42");
        assert_eq!(canonical_form("01.500", &xsd("decimal")), "1.5");
        assert_eq!(canonical_form("-.0", &xsd("decimal")), "0.0");
        assert_eq!(canonical_form("3", &xsd("decimal")), "3.0");
        assert_eq!(canonical_form("abc", &xsd("integer")), "abc");
        assert_eq!(canonical_form("1", "http://example.org/dt"), "1");
    }
}
