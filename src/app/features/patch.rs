use serde::{de::Deserializer, Deserialize};

/// Deserializes a JSON value so that missing key => None, present null => Some(None), present value => Some(Some(v)).
/// Lets PATCH bodies tell "leave unchanged" apart from "clear".
pub fn deserialize_optional_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_optional_option")]
        parent: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_missing_from_null() {
        let missing: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.parent, None);
        let null: Body = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        assert_eq!(null.parent, Some(None));
        let set: Body = serde_json::from_str(r#"{"parent": "x"}"#).unwrap();
        assert_eq!(set.parent, Some(Some("x".to_string())));
    }
}
