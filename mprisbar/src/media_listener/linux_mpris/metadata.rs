use std::collections::HashMap;

use zbus::zvariant::{Array, OwnedValue};

use crate::metadata::{Metadata, MetadataValue};

/// Decode the `Metadata` property of a player into backend-neutral values.
pub fn decode(values: HashMap<String, OwnedValue>) -> Metadata {
    values
        .into_iter()
        .map(|(key, value)| {
            let value = decode_value(&value);
            (key, value)
        })
        .collect()
}

fn decode_value(value: &OwnedValue) -> MetadataValue {
    if let Ok(s) = value.downcast_ref::<&str>() {
        return MetadataValue::Str(s.to_string());
    }

    if let Some(list) = value
        .downcast_ref::<Array>()
        .ok()
        .and_then(|v| Vec::<String>::try_from(v).ok())
    {
        return MetadataValue::StrList(list);
    }

    // mpris:length is x in MPRIS but plenty of players send t or i
    if let Ok(n) = value.downcast_ref::<i64>() {
        MetadataValue::Int(n)
    } else if let Ok(n) = value.downcast_ref::<u64>() {
        i64::try_from(n).map_or(MetadataValue::Other, MetadataValue::Int)
    } else if let Ok(n) = value.downcast_ref::<i32>() {
        MetadataValue::Int(n.into())
    } else if let Ok(n) = value.downcast_ref::<u32>() {
        MetadataValue::Int(n.into())
    } else {
        MetadataValue::Other
    }
}
