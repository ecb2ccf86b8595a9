use serde::{Deserialize, Serialize};

macro_rules! listing_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

listing_id!(
    /// identifies a user profile. profiles are owned by the (external)
    /// account system; the engine only stores and references them.
    ProfileId
);
listing_id!(
    /// identifies a ride offer in the listing store.
    OfferId
);
listing_id!(
    /// identifies a ride request in the listing store.
    RequestId
);

/// formats a store sequence number the way document ids look: 24 lowercase hex digits.
pub fn document_id(sequence: u64) -> String {
    format!("{sequence:024x}")
}

/// recovers the sequence number from a document id, if it has that shape.
pub fn document_sequence(id: &str) -> Option<u64> {
    if id.len() == 24 {
        u64::from_str_radix(id, 16).ok()
    } else {
        None
    }
}
