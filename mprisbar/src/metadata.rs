use std::collections::HashMap;

/// A loosely-typed metadata value, already decoded from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Str(String),
    StrList(Vec<String>),
    Int(i64),
    Other,
}

/// A structured representation of a player's track metadata.
///
/// * [Read more about the MPRIS2 `Metadata_Map` type.][metadata_map]
/// * [Read MPRIS v2 metadata guidelines][metadata_guidelines]
///
/// Every accessor returns [`None`] when the key is missing or holds a value
/// of an unexpected shape.
///
/// [metadata_map]: https://specifications.freedesktop.org/mpris-spec/latest/Track_List_Interface.html#Mapping:Metadata_Map
/// [metadata_guidelines]: https://www.freedesktop.org/wiki/Specifications/mpris-spec/metadata/
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metadata {
    values: HashMap<String, MetadataValue>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The name of the track.
    ///
    /// Based on `xesam:title`
    pub fn title(&self) -> Option<&str> {
        self.get_str("xesam:title")
    }

    /// The name of the album the track appears on.
    ///
    /// Based on `xesam:album`
    pub fn album_name(&self) -> Option<&str> {
        self.get_str("xesam:album")
    }

    /// The track artist(s), joined with `", "`.
    ///
    /// Based on `xesam:artist`. Some players send a single string instead of
    /// the list the MPRIS spec asks for, both are accepted.
    pub fn artists(&self) -> Option<String> {
        match self.get("xesam:artist")? {
            MetadataValue::Str(s) => Some(s.clone()),
            MetadataValue::StrList(list) => Some(list.join(", ")),
            _ => None,
        }
    }

    /// The duration of the track, in microseconds
    ///
    /// Based on `mpris:length`
    pub fn length_in_microseconds(&self) -> Option<i64> {
        match self.get("mpris:length")? {
            MetadataValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromIterator<(String, MetadataValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        Metadata {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(entries: &[(&str, MetadataValue)]) -> Metadata {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn artist_list_is_joined() {
        let md = metadata(&[(
            "xesam:artist",
            MetadataValue::StrList(vec!["Daft Punk".into(), "Pharrell".into()]),
        )]);
        assert_eq!(md.artists().as_deref(), Some("Daft Punk, Pharrell"));
    }

    #[test]
    fn artist_single_string_is_accepted() {
        let md = metadata(&[("xesam:artist", MetadataValue::Str("Air".into()))]);
        assert_eq!(md.artists().as_deref(), Some("Air"));
    }

    #[test]
    fn wrong_shapes_decode_to_none() {
        let md = metadata(&[
            ("xesam:title", MetadataValue::StrList(vec!["x".into()])),
            ("xesam:album", MetadataValue::Int(3)),
            ("xesam:artist", MetadataValue::Other),
            ("mpris:length", MetadataValue::Str("long".into())),
        ]);
        assert_eq!(md.title(), None);
        assert_eq!(md.album_name(), None);
        assert_eq!(md.artists(), None);
        assert_eq!(md.length_in_microseconds(), None);
    }
}
