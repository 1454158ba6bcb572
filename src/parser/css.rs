//! Stylesheet scanning on `cssparser`.
//!
//! Walks the token stream and keeps what the stylesheet rules need:
//! `property: value` declarations inside blocks and at-rule names. Strings,
//! `url()` and comments are handled by the tokenizer.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::core::{DiagBuilder, Diagnostic, Position, offset_to_position};

pub const SOURCE: &str = "epub-css";

/// `property: value` found inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub property: String,
    /// Value tokens, whitespace runs collapsed to one space, comments dropped.
    pub value: String,
    pub offset: usize,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Including the `@`, e.g. `@font-face`.
    pub name: String,
    pub offset: usize,
    pub pos: Position,
}

#[derive(Debug, Default)]
pub struct CssScan {
    pub properties: Vec<PropertyDecl>,
    pub at_rules: Vec<AtRule>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract declarations and at-rules, reporting encoding and structural errors.
pub fn scan_css(content: &[u8]) -> CssScan {
    let Ok(text) = std::str::from_utf8(content) else {
        let mut scan = CssScan::default();
        scan.diagnostics.push(
            DiagBuilder::new(content, 0, SOURCE)
                .code("CSS_003")
                .error("CSS file is not valid UTF-8"),
        );
        return scan;
    };

    let mut scanner = Scanner {
        content,
        scan: CssScan::default(),
        unclosed: false,
    };
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    // The scanner never fails; errors become diagnostics.
    let _ = scanner.body(&mut parser, true);
    scanner.scan
}

// ============================================================================
// Scanner
// ============================================================================

/// Progress through one block item (declaration, nested rule or at-rule).
enum Item {
    Start,
    Name { name: String, offset: usize },
    Value { name: String, offset: usize, value: String },
    /// Not a declaration; ignored up to the next `;` or block.
    Skip,
}

struct Scanner<'a> {
    content: &'a [u8],
    scan: CssScan,
    /// An unclosed `{` is reported once per stylesheet.
    unclosed: bool,
}

type ScanResult<'i, T = ()> = Result<T, ParseError<'i, ()>>;

impl Scanner<'_> {
    /// Scan a rule list or block body. Declarations are only kept below the top level.
    fn body<'i>(&mut self, input: &mut Parser<'i, '_>, top_level: bool) -> ScanResult<'i> {
        let mut item = Item::Start;
        let mut space = false;

        loop {
            let start = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            let offset = start.byte_index();

            match token {
                Token::WhiteSpace(_) => space = true,
                Token::Comment(_) => {
                    let text = input.slice_from(start);
                    if text.len() < 4 || !text.ends_with("*/") {
                        self.error(offset, "unclosed comment");
                    }
                }
                Token::Semicolon => {
                    self.finish(std::mem::replace(&mut item, Item::Start), top_level);
                }
                Token::CurlyBracketBlock => {
                    item = Item::Start;
                    self.block(input)?;
                }
                Token::CloseCurlyBracket => {
                    item = Item::Start;
                    self.error(offset, "unexpected '}'");
                }
                Token::BadString(_) => {
                    item = Item::Skip;
                    self.error(offset, "unclosed string");
                }
                Token::BadUrl(_) => {
                    item = Item::Skip;
                    self.error(offset, "malformed url()");
                }
                token => {
                    item = match (std::mem::replace(&mut item, Item::Skip), token) {
                        (Item::Start, Token::Ident(name)) => Item::Name {
                            name: String::from(&*name),
                            offset,
                        },
                        (Item::Start, Token::AtKeyword(name)) => {
                            self.at_rule(&name, offset);
                            Item::Skip
                        }
                        (Item::Name { name, offset }, Token::Colon) => Item::Value {
                            name,
                            offset,
                            value: String::new(),
                        },
                        (Item::Value { name, offset, mut value }, token) => {
                            if matches!(
                                token,
                                Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
                            ) {
                                input.parse_nested_block(|block| skip_block(block))?;
                            }
                            if space && !value.is_empty() {
                                value.push(' ');
                            }
                            value.push_str(input.slice_from(start));
                            Item::Value { name, offset, value }
                        }
                        _ => Item::Skip,
                    };
                    space = false;
                }
            }
        }

        self.finish(item, top_level);
        Ok(())
    }

    /// Scan a `{}` block just returned by the parser.
    fn block<'i>(&mut self, input: &mut Parser<'i, '_>) -> ScanResult<'i> {
        let inner_end = input.parse_nested_block(|block| -> ScanResult<'i, usize> {
            self.body(block, false)?;
            Ok(block.position().byte_index())
        })?;

        // A closed block consumed its `}` past the inner end.
        if input.position().byte_index() == inner_end && !self.unclosed {
            self.unclosed = true;
            self.error(self.content.len(), "unclosed '{'");
        }
        Ok(())
    }

    fn finish(&mut self, item: Item, top_level: bool) {
        if let Item::Value { name, offset, value } = item
            && !top_level
        {
            self.scan.properties.push(PropertyDecl {
                property: name,
                value,
                offset,
                pos: offset_to_position(self.content, offset),
            });
        }
    }

    fn at_rule(&mut self, name: &str, offset: usize) {
        self.scan.at_rules.push(AtRule {
            name: format!("@{name}"),
            offset,
            pos: offset_to_position(self.content, offset),
        });
    }

    fn error(&mut self, offset: usize, what: &str) {
        self.scan.diagnostics.push(
            DiagBuilder::new(self.content, offset, SOURCE)
                .code("CSS_008")
                .error(format!("CSS parse error: {what}")),
        );
    }
}

fn skip_block<'i>(input: &mut Parser<'i, '_>) -> ScanResult<'i> {
    while input.next_including_whitespace_and_comments().is_ok() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(scan: &CssScan) -> Vec<&str> {
        scan.diagnostics.iter().filter_map(|d| d.code).collect()
    }

    #[test]
    fn test_valid_css() {
        let scan = scan_css(
            b"\nbody {\n  margin: 0;\n  padding: 10px;\n  font-family: serif;\n}\n\nh1 {\n  color: #333;\n}\n",
        );
        assert!(scan.diagnostics.is_empty());
        assert_eq!(scan.properties.len(), 4);
        assert_eq!(scan.properties[0].property, "margin");
        assert_eq!(scan.properties[0].pos, Position::new(2, 2));
        assert_eq!(scan.properties[3].value, "#333");
    }

    #[test]
    fn test_value_tokens_joined() {
        let scan = scan_css(b"p { font: 12px   serif }");
        assert_eq!(scan.properties[0].value, "12px serif");
        assert!(scan.diagnostics.is_empty());

        let scan = scan_css(b"p { color : red /* note */ !important; }");
        assert_eq!(scan.properties[0].value, "red !important");
    }

    #[test]
    fn test_functions_kept_whole() {
        let scan = scan_css(br#"@font-face { src: url("a;b.woff") format( "woff" ), url(c.otf); }"#);
        assert!(scan.diagnostics.is_empty());
        assert_eq!(scan.properties.len(), 1);
        assert_eq!(
            scan.properties[0].value,
            r#"url("a;b.woff") format( "woff" ), url(c.otf)"#
        );
    }

    #[test]
    fn test_braces_inside_strings() {
        let scan = scan_css(b"p::before { content: \"}\"; }\n");
        assert!(scan.diagnostics.is_empty());
        assert_eq!(scan.properties[0].property, "content");
        assert_eq!(scan.properties[0].value, "\"}\"");

        let scan = scan_css(b"q::after { content: '{'; }");
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn test_unclosed_brace() {
        let scan = scan_css(b"body { margin: 0;");
        assert_eq!(codes(&scan), ["CSS_008"]);
        assert!(scan.diagnostics[0].message.contains("unclosed '{'"));
        assert_eq!(scan.properties.len(), 1);

        let scan = scan_css(b"@media print { p { color: red;");
        assert_eq!(codes(&scan), ["CSS_008"]);
    }

    #[test]
    fn test_unclosed_comment() {
        let scan = scan_css(b"/* unclosed comment\nbody { margin: 0; }");
        assert_eq!(codes(&scan), ["CSS_008"]);
        assert!(scan.diagnostics[0].message.contains("unclosed comment"));
    }

    #[test]
    fn test_extra_brace_close() {
        let scan = scan_css(b"body { margin: 0; }}");
        assert_eq!(codes(&scan), ["CSS_008"]);
        assert!(scan.diagnostics[0].message.contains("unexpected '}'"));
        assert_eq!(scan.diagnostics[0].range.start, Position::new(0, 19));
    }

    #[test]
    fn test_unclosed_string() {
        let scan = scan_css(b"p { content: \"open\n}");
        assert_eq!(codes(&scan), ["CSS_008"]);
        assert!(scan.diagnostics[0].message.contains("unclosed string"));
    }

    #[test]
    fn test_invalid_utf8() {
        let scan = scan_css(&[b'p', b'{', 0xff, 0xfe, b'}']);
        assert_eq!(codes(&scan), ["CSS_003"]);
    }

    #[test]
    fn test_division_in_value() {
        let scan = scan_css(b"p { width: 10px / 2; }");
        assert_eq!(scan.properties[0].value, "10px / 2");

        let scan = scan_css(b"/");
        assert!(scan.diagnostics.is_empty());
    }

    #[test]
    fn test_nested_pseudo_selector_is_not_a_declaration() {
        let scan = scan_css(b"@media screen { p:first-child { color: red; } }");
        assert!(scan.diagnostics.is_empty());
        assert_eq!(scan.at_rules[0].name, "@media");
        let names: Vec<_> = scan.properties.iter().map(|p| p.property.as_str()).collect();
        assert_eq!(names, ["color"]);
    }

    #[test]
    fn test_selector_at_top_level_ignored() {
        let scan = scan_css(b"a:hover { color: blue; }");
        assert_eq!(scan.properties.len(), 1);
        assert_eq!(scan.properties[0].property, "color");
    }
}
