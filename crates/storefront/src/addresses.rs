//! Session-scoped address book.
//!
//! Delivery addresses live in the storefront session, not in the commerce
//! API. Each saved address gets a stable generated id so selections and
//! edits refer to an identifier rather than a list position.

use serde::{Deserialize, Serialize};

use marigold_core::{Address, AddressError, AddressId};

/// Address book failures.
#[derive(Debug, thiserror::Error)]
pub enum AddressBookError {
    #[error("Invalid address: {0}")]
    Invalid(#[from] AddressError),
    #[error("Address not found")]
    NotFound,
}

/// An address with its stable book id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: AddressId,
    #[serde(flatten)]
    pub address: Address,
}

/// The shopper's saved addresses plus the current checkout selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    addresses: Vec<SavedAddress>,
    selected: Option<AddressId>,
}

impl AddressBook {
    /// Validate and save a new address, returning its generated id.
    ///
    /// The first saved address becomes the selection.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::Invalid`] if validation fails.
    pub fn add(&mut self, address: Address) -> Result<AddressId, AddressBookError> {
        address.validate()?;
        let id = AddressId::from(uuid::Uuid::new_v4().to_string());
        self.addresses.push(SavedAddress {
            id: id.clone(),
            address,
        });
        if self.selected.is_none() {
            self.selected = Some(id.clone());
        }
        Ok(id)
    }

    /// Validate and replace an existing address in place.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::NotFound`] for an unknown id.
    pub fn update(&mut self, id: &AddressId, address: Address) -> Result<(), AddressBookError> {
        address.validate()?;
        let entry = self
            .addresses
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or(AddressBookError::NotFound)?;
        entry.address = address;
        Ok(())
    }

    /// Remove an address. A dangling selection is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::NotFound`] for an unknown id.
    pub fn remove(&mut self, id: &AddressId) -> Result<(), AddressBookError> {
        let before = self.addresses.len();
        self.addresses.retain(|a| &a.id != id);
        if self.addresses.len() == before {
            return Err(AddressBookError::NotFound);
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Mark an address as the checkout selection.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::NotFound`] for an unknown id.
    pub fn select(&mut self, id: &AddressId) -> Result<(), AddressBookError> {
        if !self.addresses.iter().any(|a| &a.id == id) {
            return Err(AddressBookError::NotFound);
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// The currently selected address, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&SavedAddress> {
        let id = self.selected.as_ref()?;
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// Look up an address by id.
    #[must_use]
    pub fn get(&self, id: &AddressId) -> Option<&SavedAddress> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// Iterate all saved addresses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SavedAddress> {
        self.addresses.iter()
    }

    /// Number of saved addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True when no addresses are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_address() -> Address {
        Address {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62704".into(),
            country: "USA".into(),
        }
    }

    #[test]
    fn test_add_validates() {
        let mut book = AddressBook::default();
        let mut bad = valid_address();
        bad.city = String::new();
        assert!(matches!(
            book.add(bad),
            Err(AddressBookError::Invalid(AddressError::MissingField("city")))
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_first_added_address_is_selected() {
        let mut book = AddressBook::default();
        let id = book.add(valid_address()).unwrap();
        assert_eq!(book.selected().unwrap().id, id);
    }

    #[test]
    fn test_ids_are_stable_across_removal() {
        let mut book = AddressBook::default();
        let first = book.add(valid_address()).unwrap();
        let second = book.add(valid_address()).unwrap();
        book.remove(&first).unwrap();
        assert!(book.get(&second).is_some());
        assert_eq!(book.get(&second).unwrap().id, second);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut book = AddressBook::default();
        let id = book.add(valid_address()).unwrap();
        book.remove(&id).unwrap();
        assert!(book.selected().is_none());
    }

    #[test]
    fn test_remove_unselected_keeps_selection() {
        let mut book = AddressBook::default();
        let first = book.add(valid_address()).unwrap();
        let second = book.add(valid_address()).unwrap();
        book.remove(&second).unwrap();
        assert_eq!(book.selected().unwrap().id, first);
    }

    #[test]
    fn test_select_unknown_id_fails() {
        let mut book = AddressBook::default();
        book.add(valid_address()).unwrap();
        let err = book.select(&AddressId::from("nope")).unwrap_err();
        assert!(matches!(err, AddressBookError::NotFound));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut book = AddressBook::default();
        let id = book.add(valid_address()).unwrap();
        let mut updated = valid_address();
        updated.city = "Shelbyville".into();
        book.update(&id, updated).unwrap();
        assert_eq!(book.get(&id).unwrap().address.city, "Shelbyville");
        assert_eq!(book.len(), 1);
    }
}
