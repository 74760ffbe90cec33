//! Field-index key layout
//!
//! ```text
//! family    = "fi\0" + field name
//! qualifier = field value + '\0' + data type + '\0' + uid
//! ```
//!
//! Field values may contain `\0`, so the qualifier is split from its tail.

/// Family prefix of every field-index entry
pub const FIELD_INDEX_PREFIX: &[u8] = b"fi\0";

/// Decomposed field-index qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIndexQualifier<'a> {
    pub value: &'a [u8],
    pub data_type: &'a [u8],
    pub uid: &'a [u8],
}

/// Whether `family` lies in the field-index keyspace.
pub fn is_field_index_family(family: &[u8]) -> bool {
    family.starts_with(FIELD_INDEX_PREFIX)
}

/// `"fi\0" + name`
pub fn field_index_family(name: &[u8]) -> Vec<u8> {
    let mut family = Vec::with_capacity(FIELD_INDEX_PREFIX.len() + name.len());
    family.extend_from_slice(FIELD_INDEX_PREFIX);
    family.extend_from_slice(name);
    family
}

/// Field name of a field-index family, `None` outside the keyspace.
pub fn field_name(family: &[u8]) -> Option<&[u8]> {
    family.strip_prefix(FIELD_INDEX_PREFIX)
}

/// Split a qualifier from its tail: the last `\0` separates the uid, the one
/// before it separates the data type from the value. `None` when fewer than
/// two separators are present.
pub fn parse_qualifier(qualifier: &[u8]) -> Option<FieldIndexQualifier<'_>> {
    let uid_sep = qualifier.iter().rposition(|b| *b == 0)?;
    let type_sep = qualifier[..uid_sep].iter().rposition(|b| *b == 0)?;
    Some(FieldIndexQualifier {
        value: &qualifier[..type_sep],
        data_type: &qualifier[type_sep + 1..uid_sep],
        uid: &qualifier[uid_sep + 1..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_qualifier() {
        let parsed = parse_qualifier(b"red\0csv\0uid-1").unwrap();
        assert_eq!(parsed.value, b"red");
        assert_eq!(parsed.data_type, b"csv");
        assert_eq!(parsed.uid, b"uid-1");
    }

    #[test]
    fn test_value_with_embedded_nulls() {
        let parsed = parse_qualifier(b"a\0b\0c\0json\0u9").unwrap();
        assert_eq!(parsed.value, b"a\0b\0c");
        assert_eq!(parsed.data_type, b"json");
        assert_eq!(parsed.uid, b"u9");
    }

    #[test]
    fn test_empty_parts_allowed() {
        let parsed = parse_qualifier(b"\0\0").unwrap();
        assert!(parsed.value.is_empty());
        assert!(parsed.data_type.is_empty());
        assert!(parsed.uid.is_empty());
    }

    #[test]
    fn test_missing_separators() {
        assert!(parse_qualifier(b"red").is_none());
        assert!(parse_qualifier(b"red\0csv").is_none());
        assert!(parse_qualifier(b"").is_none());
    }

    #[test]
    fn test_family_helpers() {
        let family = field_index_family(b"COLOR");
        assert_eq!(family, b"fi\0COLOR".to_vec());
        assert!(is_field_index_family(&family));
        assert_eq!(field_name(&family), Some(b"COLOR".as_slice()));
        assert!(!is_field_index_family(b"fi"));
        assert!(!is_field_index_family(b"d"));
        assert_eq!(field_name(b"tf"), None);
    }
}
