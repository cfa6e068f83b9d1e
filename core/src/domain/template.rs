//! Port URI template.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Placeholder name substituted with the port number.
const PORT_PLACEHOLDER: &str = "port";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Port,
}

/// A URI pattern with a `{port}` placeholder.
///
/// The Handlebars spellings `{{port}}` and `{{{port}}}` are accepted as the
/// same placeholder.
/// The placeholder is the only substitution; any other `{...}` is rejected
/// when the template is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UriTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: &str| ConfigurationError::MalformedTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(idx) = rest.find(['{', '}']) {
            let (before, after) = rest.split_at(idx);
            literal.push_str(before);

            if after.starts_with('}') {
                return Err(malformed("unbalanced '}'"));
            }

            let (open_len, close) = if after.starts_with("{{{") {
                (3, "}}}")
            } else if after.starts_with("{{") {
                (2, "}}")
            } else {
                (1, "}")
            };
            let inner = &after[open_len..];
            let end = inner
                .find(close)
                .ok_or_else(|| malformed("unterminated placeholder"))?;
            let name = inner[..end].trim();

            if name != PORT_PLACEHOLDER {
                return Err(malformed(&format!("unknown placeholder '{}'", name)));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Port);
            rest = &inner[end + close.len()..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !segments.contains(&Segment::Port) {
            return Err(malformed("missing {port} placeholder"));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Substitute the port number into the template.
    pub fn render(&self, port: u16) -> String {
        let port = port.to_string();
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(s) => s.as_str(),
                Segment::Port => port.as_str(),
            })
            .collect()
    }

    /// The original template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl TryFrom<String> for UriTemplate {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UriTemplate> for String {
    fn from(template: UriTemplate) -> Self {
        template.source
    }
}

impl std::fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_brace() {
        let template = UriTemplate::parse("http://localhost:{port}").unwrap();
        assert_eq!(template.render(3000), "http://localhost:3000");
    }

    #[test]
    fn test_render_handlebars_spelling() {
        let template = UriTemplate::parse("https://{{ port }}-dev.example.com/").unwrap();
        assert_eq!(template.render(8080), "https://8080-dev.example.com/");
    }

    #[test]
    fn test_render_triple_stash() {
        let template = UriTemplate::parse("http://localhost:{{{port}}}/").unwrap();
        assert_eq!(template.render(5173), "http://localhost:5173/");
        assert!(UriTemplate::parse("http://localhost:{{{port}}").is_err());
    }

    #[test]
    fn test_repeated_placeholder() {
        let template = UriTemplate::parse("https://p{port}.example.com/{port}").unwrap();
        assert_eq!(template.render(5), "https://p5.example.com/5");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "http://localhost:3000",
            "http://localhost:{host}",
            "http://localhost:{port",
            "http://localhost:port}",
            "http://{port}}",
            "",
        ] {
            assert!(
                matches!(
                    UriTemplate::parse(bad),
                    Err(ConfigurationError::MalformedTemplate { .. })
                ),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_round_trips_source() {
        let template = UriTemplate::parse("http://localhost:{{port}}").unwrap();
        assert_eq!(template.as_str(), "http://localhost:{{port}}");
        assert_eq!(template.to_string(), "http://localhost:{{port}}");
    }
}
