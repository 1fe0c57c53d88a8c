use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use url::Url;

/// Web form field names mapped to the catalog's search prefixes.
const FIELD_CODES: &[(&str, &str)] = &[
    ("title", "ti"),
    ("author", "au"),
    ("abstract", "abs"),
    ("comments", "comm"),
    ("journal_ref", "jr"),
    ("acm_class", "acm"),
    ("msc_class", "msc"),
    ("report_num", "rpt"),
    ("paper_id", "id"),
    ("doi", "doi"),
    ("orcid", "orcid"),
    ("all", "all"),
];

const DEFAULT_FIELD_CODE: &str = "all";

/// Scheme-less URLs copied from the address bar are resolved against this.
const SEARCH_BASE_URL: &str = "https://arxiv.org/";

/// Look up the catalog prefix for a web form field name, falling back to `all`.
pub fn field_code(name: &str) -> &'static str {
    FIELD_CODES
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_FIELD_CODE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchMode {
    /// `?query=...&searchtype=...` from the basic search box
    Simple,
    /// `?terms-0-term=...&terms-0-field=...` from the advanced search form
    Advanced,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("search URL has no '{0}' parameter")]
    MissingParameter(&'static str),
    #[error("search URL has no usable 'terms-N-term' parameters")]
    NoTerms,
}

/// A query string in the catalog's `prefix:(terms)` grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiQuery(String);

impl ApiQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Translate a search page URL into a catalog query.
pub fn build_query(url: &str, mode: SearchMode) -> Result<ApiQuery, QueryError> {
    let params = query_params(url)?;
    let query = match mode {
        SearchMode::Simple => simple_query(&params)?,
        SearchMode::Advanced => advanced_query(&params)?,
    };
    tracing::debug!(%query, ?mode, "derived catalog query");
    Ok(ApiQuery(query))
}

/// Decoded query parameters. Blank values are dropped and the first
/// occurrence of a repeated key wins.
fn query_params(url: &str) -> Result<HashMap<String, String>, QueryError> {
    let url = url.trim();
    let parsed = match Url::parse(url) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(SEARCH_BASE_URL)?.join(url)?,
        other => other?,
    };
    let mut params = HashMap::new();
    for (key, value) in parsed.query_pairs() {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    Ok(params)
}

fn simple_query(params: &HashMap<String, String>) -> Result<String, QueryError> {
    let text = params
        .get("query")
        .ok_or(QueryError::MissingParameter("query"))?;
    let field = params
        .get("searchtype")
        .ok_or(QueryError::MissingParameter("searchtype"))?;
    Ok(format!("{}:({})", field_code(field), text))
}

fn advanced_query(params: &HashMap<String, String>) -> Result<String, QueryError> {
    let mut parts: Vec<String> = Vec::new();

    for i in 0.. {
        let Some(term) = params.get(&format!("terms-{i}-term")) else {
            break;
        };
        // A term without a field is skipped, not treated as the end of the list.
        let Some(field) = params.get(&format!("terms-{i}-field")) else {
            continue;
        };

        let term = term.trim().replace('+', " ");
        let code = field_code(field.trim());

        if i > 0 {
            if let Some(operator) = params.get(&format!("terms-{i}-operator")) {
                parts.push(operator.to_uppercase());
            }
        }
        parts.push(format!("({code}:({term}))"));
    }

    if parts.is_empty() {
        return Err(QueryError::NoTerms);
    }
    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_code_lookup() {
        assert_eq!(field_code("title"), "ti");
        assert_eq!(field_code("author"), "au");
        assert_eq!(field_code("abstract"), "abs");
        assert_eq!(field_code("paper_id"), "id");
        assert_eq!(field_code("no_such_field"), "all");
    }

    #[test]
    fn test_simple_query() {
        let url = "https://arxiv.org/search/?query=graph+neural%20networks&searchtype=title&source=header";
        let query = build_query(url, SearchMode::Simple).unwrap();
        assert_eq!(query.as_str(), "ti:(graph neural networks)");
    }

    #[test]
    fn test_simple_query_unknown_searchtype_maps_to_all() {
        let url = "https://arxiv.org/search/?query=quantum&searchtype=everything";
        let query = build_query(url, SearchMode::Simple).unwrap();
        assert_eq!(query.as_str(), "all:(quantum)");
    }

    #[test]
    fn test_simple_query_missing_params() {
        let missing_type = "https://arxiv.org/search/?query=quantum";
        assert!(matches!(
            build_query(missing_type, SearchMode::Simple),
            Err(QueryError::MissingParameter("searchtype"))
        ));

        let missing_query = "https://arxiv.org/search/?searchtype=all";
        assert!(matches!(
            build_query(missing_query, SearchMode::Simple),
            Err(QueryError::MissingParameter("query"))
        ));

        let empty_query = "https://arxiv.org/search/?query=&searchtype=all";
        assert!(matches!(
            build_query(empty_query, SearchMode::Simple),
            Err(QueryError::MissingParameter("query"))
        ));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            build_query("https://[oops/search/?query=x&searchtype=all", SearchMode::Simple),
            Err(QueryError::InvalidUrl(_))
        ));
        assert!(matches!(
            build_query("not a url", SearchMode::Simple),
            Err(QueryError::MissingParameter("query"))
        ));
    }

    #[test]
    fn test_url_without_scheme() {
        let simple = "arxiv.org/search/?query=graph&searchtype=title";
        assert_eq!(
            build_query(simple, SearchMode::Simple).unwrap().as_str(),
            "ti:(graph)"
        );

        let advanced = "arxiv.org/search/advanced?terms-0-term=graph&terms-0-field=title\
            &terms-1-operator=or&terms-1-term=Doe&terms-1-field=author";
        assert_eq!(
            build_query(advanced, SearchMode::Advanced).unwrap().as_str(),
            "(ti:(graph)) OR (au:(Doe))"
        );

        let query_only = "?query=graph&searchtype=all";
        assert_eq!(
            build_query(query_only, SearchMode::Simple).unwrap().as_str(),
            "all:(graph)"
        );
    }

    #[test]
    fn test_query_text_is_decoded_once() {
        // `%2528` decodes to the literal text `%28`, which is passed through as typed.
        let url = "https://arxiv.org/search/?query=a%2528b%2529&searchtype=all";
        assert_eq!(
            build_query(url, SearchMode::Simple).unwrap().as_str(),
            "all:(a%28b%29)"
        );
    }

    #[test]
    fn test_advanced_query_with_operators() {
        let url = "https://arxiv.org/search/advanced?advanced=\
            &terms-0-operator=AND&terms-0-term=transformer&terms-0-field=title\
            &terms-1-operator=or&terms-1-term=Vaswani&terms-1-field=author\
            &terms-2-operator=and&terms-2-term=attention&terms-2-field=abstract";
        let query = build_query(url, SearchMode::Advanced).unwrap();
        assert_eq!(
            query.as_str(),
            "(ti:(transformer)) OR (au:(Vaswani)) AND (abs:(attention))"
        );
    }

    #[test]
    fn test_advanced_query_decodes_plus_and_trims() {
        // %2B decodes to a literal '+', which is then treated as a space.
        let url = "https://arxiv.org/search/advanced?terms-0-term=%20deep%2Blearning%20&terms-0-field=all";
        let query = build_query(url, SearchMode::Advanced).unwrap();
        assert_eq!(query.as_str(), "(all:(deep learning))");
    }

    #[test]
    fn test_advanced_query_skips_term_without_field() {
        let url = "https://arxiv.org/search/advanced?\
            terms-0-term=alpha&terms-0-field=title\
            &terms-1-term=beta\
            &terms-2-operator=AND&terms-2-term=gamma&terms-2-field=author";
        let query = build_query(url, SearchMode::Advanced).unwrap();
        assert_eq!(query.as_str(), "(ti:(alpha)) AND (au:(gamma))");
    }

    #[test]
    fn test_advanced_query_stops_at_first_gap() {
        let url = "https://arxiv.org/search/advanced?\
            terms-0-term=alpha&terms-0-field=title\
            &terms-2-operator=AND&terms-2-term=gamma&terms-2-field=author";
        let query = build_query(url, SearchMode::Advanced).unwrap();
        assert_eq!(query.as_str(), "(ti:(alpha))");
    }

    #[test]
    fn test_advanced_query_ignores_first_operator() {
        let url = "https://arxiv.org/search/advanced?terms-0-operator=AND&terms-0-term=alpha&terms-0-field=title";
        let query = build_query(url, SearchMode::Advanced).unwrap();
        assert_eq!(query.as_str(), "(ti:(alpha))");
    }

    #[test]
    fn test_advanced_query_without_terms() {
        let url = "https://arxiv.org/search/advanced?advanced=&size=50";
        assert!(matches!(
            build_query(url, SearchMode::Advanced),
            Err(QueryError::NoTerms)
        ));

        let only_unfielded = "https://arxiv.org/search/advanced?terms-0-term=alpha";
        assert!(matches!(
            build_query(only_unfielded, SearchMode::Advanced),
            Err(QueryError::NoTerms)
        ));
    }
}
