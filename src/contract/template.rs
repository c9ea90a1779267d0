//! `{name}` placeholder templates used by paths and header values.

/// One piece of a [`Template`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// A string with `{name}` placeholders, parsed once at resolution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `raw`. Returns `None` on an unbalanced brace or an empty
    /// placeholder.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while !rest.is_empty() {
            match rest.find(['{', '}']) {
                None => {
                    segments.push(Segment::Literal(rest.to_owned()));
                    break;
                }
                Some(open) if rest[open..].starts_with('{') => {
                    if open > 0 {
                        segments.push(Segment::Literal(rest[..open].to_owned()));
                    }
                    let after = &rest[open + 1..];
                    let close = after.find('}')?;
                    let name = after[..close].trim();
                    if name.is_empty() || name.contains('{') {
                        return None;
                    }
                    segments.push(Segment::Variable(name.to_owned()));
                    rest = &after[close + 1..];
                }
                Some(_) => return None,
            }
        }
        Some(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// Template text as declared.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.raw }

    #[must_use]
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Placeholder names in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns true when the template has no placeholders.
    #[must_use]
    pub fn is_static(&self) -> bool { self.variables().next().is_none() }

    /// Substitute every placeholder with the text produced by `lookup`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `lookup`.
    pub fn render<E>(&self, mut lookup: impl FnMut(&str) -> Result<String, E>) -> Result<String, E> {
        let mut rendered = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Variable(name) => rendered.push_str(&lookup(name)?),
            }
        }
        Ok(rendered)
    }
}
