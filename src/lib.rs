//! A small directory of named contacts backed by a JSON file
//!
//! [`store::Directory`] is the concurrent, file-backed contact set. The CLI and the HTTP API in
//! [`server`] only ever go through its methods.

use {
    anyhow::ensure,
    serde::{Deserialize, Serialize},
    std::fmt,
};

pub mod config;
pub mod json;
pub mod server;
pub mod store;
pub mod vcard;

/// A directory entry. The name identifies the contact.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Checks that neither the name nor the phone number is blank. The phone format is not
    /// checked.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.name.trim().is_empty(), "Name is required");
        ensure!(!self.phone.trim().is_empty(), "Phone number is required");
        Ok(())
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Contact::new("John", "0612345678").to_string(),
            "John: 0612345678"
        );
    }

    #[test]
    fn validate() {
        assert!(Contact::new("John", "0612345678").validate().is_ok());
        assert!(Contact::new("John", "not a number").validate().is_ok());

        let error = Contact::new("  ", "0612345678").validate().unwrap_err();
        assert_eq!(error.to_string(), "Name is required");

        let error = Contact::new("John", "").validate().unwrap_err();
        assert_eq!(error.to_string(), "Phone number is required");
    }
}
