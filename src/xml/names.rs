//! XML name productions

/// `NameStartChar` from XML 1.0 (fifth edition)
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// `NameChar` from XML 1.0 (fifth edition)
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// Check if a string is an XML `NCName` (a name without colons)
pub fn is_nc_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c != ':' && is_name_start_char(c) => chars.all(|c| c != ':' && is_name_char(c)),
        _ => false,
    }
}

/// Split an IRI into a namespace and a local name that is a valid `NCName`
///
/// The split happens right after the last character that cannot appear in a
/// local name, moved forward to the first character that may start one.
/// Returns `None` when either half would be empty.
pub fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let boundary = iri.rfind(|c: char| !is_name_char(c) || c == ':')?;
    let offset = iri[boundary..].find(|c: char| c != ':' && is_name_start_char(c))?;
    let (namespace, local) = iri.split_at(boundary + offset);
    if namespace.is_empty() || local.is_empty() {
        None
    } else {
        Some((namespace, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nc_names() {
        assert!(is_nc_name("foo"));
        assert!(is_nc_name("_x-1.2"));
        assert!(is_nc_name("été"));
        assert!(!is_nc_name(""));
        assert!(!is_nc_name("1abc"));
        assert!(!is_nc_name("a:b"));
        assert!(!is_nc_name("a b"));
    }

    #[test]
    fn test_split_iri() {
        assert_eq!(
            split_iri("http://schema.org/Person"),
            Some(("http://schema.org/", "Person"))
        );
        assert_eq!(
            split_iri("http://example.org/ns#name"),
            Some(("http://example.org/ns#", "name"))
        );
        assert_eq!(
            split_iri("http://example.org/2024/1st"),
            Some(("http://example.org/2024/1", "st"))
        );
        assert_eq!(split_iri("http://schema.org/"), None);
        assert_eq!(split_iri("http://example.org/123"), None);
        assert_eq!(split_iri("urn:isbn"), Some(("urn:", "isbn")));
    }
}
