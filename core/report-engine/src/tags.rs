//! FILENAME: core/report-engine/src/tags.rs
//! PURPOSE: Single-pass scanner for `{{identifier}}` placeholders.
//! CONTEXT: Template cells carry tags such as `{{amount}}`, `{{total_amount}}`
//! or `{{group_value}}`. Each cell's text is tokenized once and every tag is
//! resolved through a lookup, so substituted values are never rescanned and
//! one tag cannot partially match another.

pub const TAG_OPEN: &str = "{{";
pub const TAG_CLOSE: &str = "}}";

/// Prefix of the tags that print a group's accumulated total.
pub const TOTAL_PREFIX: &str = "total_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    /// Tag identifier, without the braces.
    Tag(&'a str),
}

/// Iterator over the literal runs and tags of a text.
pub struct Tokens<'a> {
    rest: &'a str,
}

pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        let mut search_from = 0;
        loop {
            let Some(found) = self.rest[search_from..].find(TAG_OPEN) else {
                return Some(self.take_literal(self.rest.len()));
            };
            let open = search_from + found;
            let body = open + TAG_OPEN.len();

            let Some(close) = self.rest[body..].find(TAG_CLOSE) else {
                return Some(self.take_literal(self.rest.len()));
            };
            let identifier = &self.rest[body..body + close];

            if !is_identifier(identifier) {
                // "{{{x}}": the tag starts at the next brace
                search_from = open + 1;
                continue;
            }

            if open > 0 {
                return Some(self.take_literal(open));
            }

            self.rest = &self.rest[body + close + TAG_CLOSE.len()..];
            return Some(Token::Tag(identifier));
        }
    }
}

impl<'a> Tokens<'a> {
    fn take_literal(&mut self, len: usize) -> Token<'a> {
        let (literal, rest) = self.rest.split_at(len);
        self.rest = rest;
        Token::Literal(literal)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && !s.contains(['{', '}'])
}

/// Cheap pre-check before tokenizing.
pub fn contains_tag_delimiter(text: &str) -> bool {
    text.contains(TAG_OPEN)
}

/// Identifiers of every tag in `text`, in order of appearance.
pub fn tag_names(text: &str) -> Vec<&str> {
    tokens(text)
        .filter_map(|token| match token {
            Token::Tag(name) => Some(name),
            Token::Literal(_) => None,
        })
        .collect()
}

/// The tag identifier when `text` is exactly one tag and nothing else.
pub fn sole_tag(text: &str) -> Option<&str> {
    let mut iter = tokens(text);
    match (iter.next(), iter.next()) {
        (Some(Token::Tag(name)), None) => Some(name),
        _ => None,
    }
}

/// Replaces every tag the lookup knows. Unknown tags stay in the text verbatim.
pub fn resolve<F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    for token in tokens(text) {
        match token {
            Token::Literal(literal) => out.push_str(literal),
            Token::Tag(name) => match lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str(TAG_OPEN);
                    out.push_str(name);
                    out.push_str(TAG_CLOSE);
                }
            },
        }
    }
    out
}

/// The totalized field named by a `{{total_<field>}}` tag.
pub fn total_field(tag: &str) -> Option<&str> {
    tag.strip_prefix(TOTAL_PREFIX).filter(|field| !field.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_text() {
        let found: Vec<Token> = tokens("Total {{group_value}}: {{total_amount}}!").collect();
        assert_eq!(
            found,
            vec![
                Token::Literal("Total "),
                Token::Tag("group_value"),
                Token::Literal(": "),
                Token::Tag("total_amount"),
                Token::Literal("!"),
            ]
        );
    }

    #[test]
    fn test_malformed_tags_are_literal() {
        assert_eq!(tag_names("{{}} {{open"), Vec::<&str>::new());
        assert_eq!(tag_names("{{a}b}}"), Vec::<&str>::new());
        assert_eq!(tag_names("{{{x}}"), vec!["x"]);
        assert_eq!(resolve("{{{x}}", |_| Some("1".to_string())), "{1");
    }

    #[test]
    fn test_resolve_leaves_unknown_tags() {
        let out = resolve("{{known}} and {{unknown}}", |name| {
            (name == "known").then(|| "yes".to_string())
        });
        assert_eq!(out, "yes and {{unknown}}");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let out = resolve("{{a}}", |name| match name {
            "a" => Some("{{b}}".to_string()),
            _ => Some("wrong".to_string()),
        });
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_sole_tag() {
        assert_eq!(sole_tag("{{amount}}"), Some("amount"));
        assert_eq!(sole_tag(" {{amount}}"), None);
        assert_eq!(sole_tag("{{a}}{{b}}"), None);
        assert_eq!(sole_tag("plain"), None);
    }

    #[test]
    fn test_total_field() {
        assert_eq!(total_field("total_amount"), Some("amount"));
        assert_eq!(total_field("total_"), None);
        assert_eq!(total_field("amount"), None);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            resolve("Relatório {{title}} ção", |_| Some("Vendas".to_string())),
            "Relatório Vendas ção"
        );
    }
}
