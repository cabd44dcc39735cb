use {
    crate::Contact,
    anyhow::Context,
    ical_vcard::{Contentline, Identifier, Param, ParamValue, Value},
    std::io::Write,
};

pub fn contacts_to_vcard<'a, C, W>(writer: W, contacts: C) -> anyhow::Result<()>
where
    C: IntoIterator<Item = &'a Contact>,
    W: Write,
{
    let mut writer = ical_vcard::Writer::new(writer);
    for contact in contacts {
        writer
            .write_all(contact_to_contentlines(contact).with_context(|| {
                format!("Contact \"{}\" could not be serialized to vCard", contact.name)
            })?)
            .context("Failed to write contacts to vCard")?;
    }
    Ok(())
}

fn contact_to_contentlines(contact: &Contact) -> anyhow::Result<Vec<Contentline<'static>>> {
    let formatted_number = contact
        .phone
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();

    Ok(vec![
        simple_contentline("BEGIN", Value::new("VCARD").expect("valid value")),
        simple_contentline("VERSION", Value::new("4.0").expect("valid value")),
        simple_contentline(
            "FN",
            Value::new(escape_text(&contact.name))
                .context("Name contains control characters")?,
        ),
        Contentline {
            group: None,
            name: Identifier::new("TEL").expect("valid identifier"),
            params: vec![
                Param::new(
                    Identifier::new("VALUE").expect("valid identifier"),
                    vec![ParamValue::new("uri").expect("valid parameter value")],
                )
                .expect("valid parameter"),
                Param::new(
                    Identifier::new("TYPE").expect("valid identifier"),
                    vec![ParamValue::new("cell").expect("valid parameter value")],
                )
                .expect("valid parameter"),
            ],
            value: Value::new(format!("tel:{formatted_number}"))
                .context("Phone number contains control characters")?,
        },
        simple_contentline("END", Value::new("VCARD").expect("valid value")),
    ])
}

fn simple_contentline(name: &'static str, value: Value<'static>) -> Contentline<'static> {
    Contentline {
        group: None,
        name: Identifier::new(name).expect("valid identifier"),
        params: Vec::new(),
        value,
    }
}

/// Escapes the characters that have a meaning in vCard text values.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | ',' | ';' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(contacts: &[Contact]) -> String {
        let mut output = Vec::new();
        contacts_to_vcard(&mut output, contacts).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn one_card_per_contact() {
        let vcard = export(&[
            Contact::new("Jane", "06 00 00 00 00"),
            Contact::new("Bob", "0611111111"),
        ]);

        assert_eq!(vcard.matches("BEGIN:VCARD").count(), 2);
        assert_eq!(vcard.matches("END:VCARD").count(), 2);
        assert!(vcard.contains("FN:Jane"));
        assert!(vcard.contains("tel:0600000000"));
        assert!(vcard.contains("FN:Bob"));
        assert!(vcard.contains("tel:0611111111"));
    }

    #[test]
    fn no_contacts_no_output() {
        assert!(export(&[]).is_empty());
    }

    #[test]
    fn escapes_name() {
        assert_eq!(escape_text("Doe, John; Jr\\"), "Doe\\, John\\; Jr\\\\");
        assert_eq!(escape_text("a\nb"), "a\\nb");
    }

    #[test]
    fn escaped_name_is_written() {
        let vcard = export(&[Contact::new("Doe, John", "1")]);
        assert!(vcard.contains("FN:Doe\\, John"));
    }
}
