//! JSON representation of the contacts
//!
//! This module contains the code that serializes contacts to and deserializes them from a JSON
//! representation. The same format is used for the contact store and for `export --fmt json`: an
//! array of `{"name": ..., "phone": ...}` objects, indented with two spaces.

use {
    crate::Contact,
    serde::de::Error as _,
    std::{
        collections::HashSet,
        io::{BufReader, Read, Write},
    },
};

// ========================================================================== //
// =====> serialization <==================================================== //
// ========================================================================== //

pub fn contacts_to_json<'a, C, W>(writer: W, contacts: C) -> serde_json::Result<()>
where
    C: IntoIterator<Item = &'a Contact>,
    W: Write,
{
    serde_json::to_writer_pretty(writer, &contacts.into_iter().collect::<Vec<_>>())
}

// ========================================================================== //
// =====> deserialization <================================================== //
// ========================================================================== //

/// Parses a JSON array of contacts. `null` parses as no contacts.
///
/// Fails if two contacts share a name.
pub fn contacts_from_json<R: Read>(reader: R) -> serde_json::Result<Vec<Contact>> {
    let contacts: Vec<Contact> =
        serde_json::from_reader::<_, Option<_>>(BufReader::new(reader))?.unwrap_or_default();

    if let Some(name) = first_duplicate_name(&contacts) {
        return Err(serde_json::Error::custom(format!(
            "duplicate contact name \"{name}\""
        )));
    }

    Ok(contacts)
}

fn first_duplicate_name(contacts: &[Contact]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(contacts.len());
    contacts
        .iter()
        .map(|contact| contact.name.as_str())
        .find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array() {
        let json = r#"[
            {"name": "Jane", "phone": "0600000000"},
            {"name": "Bob", "phone": "0611111111"}
        ]"#;

        assert_eq!(
            contacts_from_json(json.as_bytes()).unwrap(),
            vec![
                Contact::new("Jane", "0600000000"),
                Contact::new("Bob", "0611111111")
            ]
        );
    }

    #[test]
    fn empty_array() {
        assert!(contacts_from_json("[]".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn null_is_empty() {
        assert!(contacts_from_json("null".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn rejects_missing_field() {
        assert!(contacts_from_json(r#"[{"name": "Jane"}]"#.as_bytes()).is_err());
    }

    #[test]
    fn rejects_non_array() {
        assert!(contacts_from_json(r#"{"name": "Jane", "phone": "1"}"#.as_bytes()).is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let json = r#"[{"name": "Jane", "phone": "1"}, {"name": "Jane", "phone": "2"}]"#;

        let error = contacts_from_json(json.as_bytes()).unwrap_err();

        assert!(error.to_string().contains("duplicate contact name \"Jane\""));
    }

    #[test]
    fn writes_indented_array() {
        let contacts = [Contact::new("Bob", "0611111111")];
        let mut output = Vec::new();

        contacts_to_json(&mut output, &contacts).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "[\n  {\n    \"name\": \"Bob\",\n    \"phone\": \"0611111111\"\n  }\n]"
        );
    }

    #[test]
    fn writes_empty_array() {
        let mut output = Vec::new();
        contacts_to_json(&mut output, std::iter::empty()).unwrap();
        assert_eq!(output, b"[]");
    }
}
