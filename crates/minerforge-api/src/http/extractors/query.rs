//! Query parameter extractors.

/// Query parameters for the build status endpoint.
#[derive(Debug, Default)]
pub struct BuildStatusQuery {
    /// Build id returned by `POST /api/build-iso`.
    pub id: Option<String>,
}

impl BuildStatusQuery {
    /// Pick parameters out of decoded query pairs.
    ///
    /// A repeated `id` keeps its first value instead of failing the request.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let id = pairs
            .into_iter()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value);
        Self { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_id_wins() {
        let query = BuildStatusQuery::from_pairs(pairs(&[("x", "1"), ("id", "a"), ("id", "b")]));
        assert_eq!(query.id.as_deref(), Some("a"));
    }

    #[test]
    fn missing_id_is_none() {
        assert!(BuildStatusQuery::from_pairs(pairs(&[("x", "1")])).id.is_none());
    }
}
