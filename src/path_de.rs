use serde::de::DeserializeOwned;

use crate::error::CatalogError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, CatalogError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_catalog_error)
}

/// Same as [`from_str_with_path`] for an already parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, CatalogError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_catalog_error)
}

fn into_catalog_error(err: serde_path_to_error::Error<serde_json::Error>) -> CatalogError {
    let path = err.path().to_string();
    CatalogError::Parse { path, message: err.into_inner().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Outer { items: Vec<Inner> }

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Inner { n: u32 }

    #[test]
    fn error_carries_json_path() {
        let err = from_str_with_path::<Outer>(r#"{"items": [{"n": 1}, {"n": "x"}]}"#).unwrap_err();
        match err {
            CatalogError::Parse { path, .. } => assert_eq!(path, "items[1].n"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
