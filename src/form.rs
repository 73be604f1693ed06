//! Submitted form fields, kept as an ordered multi-map.
//!
//! Both the query string of a GET request and the url-encoded body of a POST
//! request decode into a list of `(name, value)` pairs. Fields such as
//! `level_filter` legitimately repeat, so the pairs are kept as-is.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        FormData { fields }
    }

    /// Whether the field was submitted at all, even with a blank value.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// The first value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted for `name`, in submission order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether the field carries a non-blank value (checkbox semantics).
    pub fn is_checked(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        FormData::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_valued_fields_keep_order() {
        let form: FormData = [("level_filter", "18"), ("x", "1"), ("level_filter", "20")]
            .into_iter()
            .collect();
        assert_eq!(form.get_all("level_filter"), vec!["18", "20"]);
        assert_eq!(form.get("level_filter"), Some("18"));
        assert!(form.get_all("missing").is_empty());
    }

    #[test]
    fn blank_values_are_present_but_unchecked() {
        let form: FormData = [("submit", ""), ("count", "on")].into_iter().collect();
        assert!(form.contains("submit"));
        assert!(!form.is_checked("submit"));
        assert!(form.is_checked("count"));
        assert!(!form.contains("about"));
    }
}
