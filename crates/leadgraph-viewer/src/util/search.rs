use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Default)]
pub enum SearchQuery {
    #[default]
    Empty,
    Pattern(Regex),
    Text(String),
}

impl SearchQuery {
    pub fn parse(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            return Self::Empty;
        }
        match RegexBuilder::new(term).case_insensitive(true).build() {
            Ok(re) => Self::Pattern(re),
            Err(err) => {
                tracing::debug!(%term, %err, "search term is not a regex, matching as text");
                Self::Text(term.to_lowercase())
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    pub fn matches(&self, s: &str) -> bool {
        match self {
            Self::Empty => false,
            Self::Pattern(re) => re.is_match(s),
            Self::Text(t) => s.to_lowercase().contains(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_term_is_inactive() {
        let q = SearchQuery::parse("   ");
        assert!(!q.is_active());
        assert!(!q.matches("anything"));
    }

    #[test]
    fn matches_ignore_case() {
        let q = SearchQuery::parse("b");
        assert!(q.matches("B"));
        assert!(q.matches("Bob"));
        assert!(!q.matches("Alice"));
    }

    #[test]
    fn regex_terms_work_and_broken_ones_fall_back() {
        assert!(SearchQuery::parse("^em").matches("Emma"));
        assert!(!SearchQuery::parse("^em").matches("Tem"));

        let broken = SearchQuery::parse("ann(");
        assert!(matches!(broken, SearchQuery::Text(_)));
        assert!(broken.matches("Joann(e)"));
    }
}
