use serde::{Deserialize, Serialize};
use wiki_hash::Ident;

/// A commit record.
///
/// The JSON body keeps exactly these field names, idents as hex strings and
/// `previous_commit` null for the first commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(with = "hex_ident")]
    pub tree: Ident,
    /// Unix seconds.
    pub timestamp: i64,
    /// Seconds east of UTC.
    pub utc_offset: i32,
    #[serde(default, with = "hex_ident_opt")]
    pub previous_commit: Option<Ident>,
}

mod hex_ident {
    use serde::{Deserialize, Deserializer, Serializer};
    use wiki_hash::Ident;

    pub fn serialize<S: Serializer>(ident: &Ident, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&ident.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Ident, D::Error> {
        let hex = String::deserialize(de)?;
        Ident::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

mod hex_ident_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use wiki_hash::Ident;

    pub fn serialize<S: Serializer>(ident: &Option<Ident>, ser: S) -> Result<S::Ok, S::Error> {
        match ident {
            Some(ident) => ser.serialize_some(&ident.to_hex()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Ident>, D::Error> {
        let hex: Option<String> = Option::deserialize(de)?;
        hex.map(|h| Ident::from_hex(&h).map_err(serde::de::Error::custom))
            .transpose()
    }
}
