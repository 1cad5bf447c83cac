//! Directory module - normalized rows of the reference directory

use crate::normalize::normalize;
use crate::record::ContactResult;

/// One row of the reference directory, with normalized lookup keys
///
/// Immutable once built. `declarant_key` and `address_key` are never both
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    declarant_key: String,
    address_key: String,
    phone: Option<String>,
    email: Option<String>,
}

impl DirectoryEntry {
    /// Build an entry from raw source text
    ///
    /// Returns `None` when neither the declarant nor the address normalizes
    /// to a non-empty key.
    ///
    /// # Examples
    ///
    /// ```
    /// use actes_domain::DirectoryEntry;
    ///
    /// let entry = DirectoryEntry::from_source("Pompes Funèbres Martin", "12, rue Neuve", Some("0102030405"), None).unwrap();
    /// assert_eq!(entry.declarant_key(), "pompesfunebresmartin");
    /// assert_eq!(entry.address_key(), "12rueneuve");
    ///
    /// assert!(DirectoryEntry::from_source(" ", "-", None, None).is_none());
    /// ```
    pub fn from_source(
        declarant: &str,
        address: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Option<Self> {
        let declarant_key = normalize(declarant);
        let address_key = normalize(address);

        if declarant_key.is_empty() && address_key.is_empty() {
            return None;
        }

        let contact = ContactResult::new(phone.map(String::from), email.map(String::from));

        Some(Self {
            declarant_key,
            address_key,
            phone: contact.phone,
            email: contact.email,
        })
    }

    /// Normalized declarant key
    pub fn declarant_key(&self) -> &str {
        &self.declarant_key
    }

    /// Normalized address key
    pub fn address_key(&self) -> &str {
        &self.address_key
    }

    /// Contact stored for this entry
    pub fn contact(&self) -> ContactResult {
        ContactResult {
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}
