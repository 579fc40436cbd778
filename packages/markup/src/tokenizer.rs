use logos::{Lexer, Logos, Skip};
use std::fmt;

/// Tokens between tags
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum ContentToken<'src> {
    // Comments, doctype and processing instructions never reach the parser
    #[token("<!", skip_declaration)]
    #[token("<?", skip_declaration)]
    Declaration,

    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", |lex| &lex.slice()[1..])]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", close_tag_name)]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens inside an opening tag, after its name
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TagToken<'src> {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClosingEnd,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Quoted(&'src str),

    #[regex(r#"[^ \t\r\n=<>"'/][^ \t\r\n=<>"']*"#, |lex| lex.slice())]
    Word(&'src str),
}

fn skip_declaration<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> Skip {
    let rest = lex.remainder();
    let consumed = if rest.starts_with("--") {
        rest.find("-->").map(|i| i + 3)
    } else {
        rest.find('>').map(|i| i + 1)
    };
    lex.bump(consumed.unwrap_or(rest.len()));
    Skip
}

fn close_tag_name<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> &'src str {
    let slice = lex.slice();
    slice[2..slice.len() - 1].trim_end()
}

fn unquote(slice: &str) -> &str {
    &slice[1..slice.len() - 1]
}

impl<'src> fmt::Display for ContentToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentToken::Declaration => write!(f, "declaration"),
            ContentToken::OpenTag(name) => write!(f, "<{}", name),
            ContentToken::CloseTag(name) => write!(f, "</{}>", name),
            ContentToken::Text(text) => write!(f, "text '{}'", text),
        }
    }
}

impl<'src> fmt::Display for TagToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagToken::End => write!(f, ">"),
            TagToken::SelfClosingEnd => write!(f, "/>"),
            TagToken::Equals => write!(f, "="),
            TagToken::Quoted(value) => write!(f, "quoted value \"{}\"", value),
            TagToken::Word(word) => write!(f, "word '{}'", word),
        }
    }
}

/// Decode character references in text and attribute values
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_reference(&rest[1..end]).map(|ch| (ch, end)));

        match decoded {
            Some((ch, end)) => {
                output.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Tokenize content-level markup (tags are reported by name only)
pub fn tokenize(source: &str) -> Vec<(ContentToken<'_>, std::ops::Range<usize>)> {
    ContentToken::lexer(source)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_tokens() {
        let tokens = tokenize("<p>Hello</p>");

        assert_eq!(tokens[0].0, ContentToken::OpenTag("p"));
        assert_eq!(tokens[1].0, ContentToken::Text(">Hello"));
        assert_eq!(tokens[2].0, ContentToken::CloseTag("p"));
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let tokens = tokenize("<!DOCTYPE html><!-- a -- b --><p></p>");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].0, ContentToken::OpenTag("p"));
    }

    #[test]
    fn test_tag_tokens() {
        let tokens: Vec<_> = TagToken::lexer(r#" data-type="layout-block" class='a b' hidden data-columns=3>"#)
            .filter_map(Result::ok)
            .collect();

        assert_eq!(
            tokens,
            vec![
                TagToken::Word("data-type"),
                TagToken::Equals,
                TagToken::Quoted("layout-block"),
                TagToken::Word("class"),
                TagToken::Equals,
                TagToken::Quoted("a b"),
                TagToken::Word("hidden"),
                TagToken::Word("data-columns"),
                TagToken::Equals,
                TagToken::Word("3"),
                TagToken::End,
            ]
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }
}
