use serde::{Deserialize, Serialize};

/// Identity of a message sender.
///
/// Transports without a stable identity (SMS only knows a phone number) use
/// the address for both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// A user known only by a transport address.
    pub fn from_address(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            id: address.clone(),
            name: address,
        }
    }
}
