//! Ordered multi-map of flattened parameters.

use url::form_urlencoded;

/// Ordered key/value pairs; duplicate keys are allowed and kept in
/// insertion order.
///
/// # Examples
///
/// ```
/// use restframe::form::Parameters;
///
/// let mut parameters = Parameters::new();
/// parameters.push("tag", "a b");
/// parameters.push("tag", "c");
/// assert_eq!(parameters.query_string(), "tag=a+b&tag=c");
/// assert_eq!(parameters.get_all("tag").collect::<Vec<_>>(), ["a b", "c"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Parse an `application/x-www-form-urlencoded` string.
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        form_urlencoded::parse(encoded.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Append every pair of `other`, preserving its order.
    pub fn append(&mut self, other: Parameters) { self.0.extend(other.0); }

    /// First value recorded for `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value recorded for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Encode as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl FromIterator<(String, String)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Parameters {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}
