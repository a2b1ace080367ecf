//! Go source header scanning
//!
//! Reads just enough of a `.go` file to learn its package name and the
//! import paths it declares: the package clause followed by any number of
//! `import` declarations. Scanning stops at the first other declaration.

use std::iter::Peekable;
use std::str::CharIndices;

/// Package clause and imports of one Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoFileHeader {
    pub package: String,
    /// Import paths in declaration order, duplicates kept
    pub imports: Vec<String>,
}

impl GoFileHeader {
    pub fn imports_cgo(&self) -> bool {
        self.imports.iter().any(|i| i == "C")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Punct(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("'{}'", s),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Punct(c) => format!("'{}'", c),
        }
    }
}

struct Scanner<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    peeked: Option<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, String> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn next(&mut self) -> Result<Option<Token>, String> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.scan(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            match self.chars.peek() {
                Some(&(_, c)) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some(&(i, '/')) => match self.src[i + 1..].chars().next() {
                    Some('/') => {
                        while self.chars.next_if(|&(_, c)| c != '\n').is_some() {}
                    }
                    Some('*') => {
                        self.chars.next();
                        self.chars.next();
                        let mut prev = '\0';
                        loop {
                            match self.chars.next() {
                                Some((_, '/')) if prev == '*' => break,
                                Some((_, c)) => prev = c,
                                None => return Err("comment not terminated".to_string()),
                            }
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn scan(&mut self) -> Result<Option<Token>, String> {
        self.skip_trivia()?;
        let Some((start, c)) = self.chars.next() else {
            return Ok(None);
        };

        match c {
            '"' => {
                let mut value = Vec::new();
                loop {
                    match self.chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => self.escape(&mut value)?,
                        Some((_, '\n')) | None => {
                            return Err("string literal not terminated".to_string());
                        }
                        Some((_, ch)) => push_char(&mut value, ch),
                    }
                }
                String::from_utf8(value)
                    .map(|value| Some(Token::Str(value)))
                    .map_err(|_| "invalid UTF-8 in string literal".to_string())
            }
            '`' => {
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, '`')) => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err("raw string literal not terminated".to_string()),
                    }
                }
                Ok(Some(Token::Str(value)))
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some((i, ch)) = self
                    .chars
                    .next_if(|&(_, ch)| ch.is_alphanumeric() || ch == '_')
                {
                    end = i + ch.len_utf8();
                }
                Ok(Some(Token::Ident(self.src[start..end].to_string())))
            }
            other => Ok(Some(Token::Punct(other))),
        }
    }

    /// Decode one escape sequence after `\` inside an interpreted string.
    fn escape(&mut self, value: &mut Vec<u8>) -> Result<(), String> {
        let Some((_, c)) = self.chars.next() else {
            return Err("escape sequence not terminated".to_string());
        };
        let simple = match c {
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            '\\' | '"' => Some(c),
            _ => None,
        };
        if let Some(ch) = simple {
            push_char(value, ch);
            return Ok(());
        }

        match c {
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    code = code * 8 + self.digit(8)?;
                }
                let byte = u8::try_from(code)
                    .map_err(|_| "octal escape value > 255".to_string())?;
                value.push(byte);
            }
            'x' => {
                let code = self.digit(16)? * 16 + self.digit(16)?;
                // Two hex digits always fit in a byte.
                value.push(code as u8);
            }
            'u' | 'U' => {
                let len = if c == 'u' { 4 } else { 8 };
                let mut code = 0;
                for _ in 0..len {
                    code = code * 16 + self.digit(16)?;
                }
                let ch = char::from_u32(code)
                    .ok_or_else(|| "escape sequence is invalid Unicode code point".to_string())?;
                push_char(value, ch);
            }
            other => return Err(format!("unknown escape sequence '\\{}'", other)),
        }
        Ok(())
    }

    fn digit(&mut self, radix: u32) -> Result<u32, String> {
        match self.chars.next() {
            Some((_, ch)) => ch
                .to_digit(radix)
                .ok_or_else(|| format!("illegal character '{}' in escape sequence", ch)),
            None => Err("escape sequence not terminated".to_string()),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, String> {
        match self.next()? {
            Some(Token::Ident(name)) => Ok(name),
            Some(tok) => Err(format!("expected {}, found {}", what, tok.describe())),
            None => Err(format!("expected {}, found EOF", what)),
        }
    }

    fn skip_semicolon(&mut self) -> Result<(), String> {
        if self.peek()? == Some(&Token::Punct(';')) {
            self.next()?;
        }
        Ok(())
    }

    /// One import spec: `[name | . | _] "path"`.
    fn import_spec(&mut self) -> Result<String, String> {
        match self.next()? {
            Some(Token::Str(path)) => Ok(path),
            Some(Token::Ident(_)) | Some(Token::Punct('.')) => match self.next()? {
                Some(Token::Str(path)) => Ok(path),
                Some(tok) => Err(format!("expected import path, found {}", tok.describe())),
                None => Err("expected import path, found EOF".to_string()),
            },
            Some(tok) => Err(format!("expected import path, found {}", tok.describe())),
            None => Err("expected import path, found EOF".to_string()),
        }
    }
}

fn push_char(value: &mut Vec<u8>, ch: char) {
    let mut buf = [0; 4];
    value.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

/// Parse the package clause and import declarations of a Go source file.
pub fn parse_header(content: &str) -> Result<GoFileHeader, String> {
    let mut scanner = Scanner::new(content);

    let keyword = scanner.expect_ident("'package'")?;
    if keyword != "package" {
        return Err(format!("expected 'package', found '{}'", keyword));
    }
    let package = scanner.expect_ident("package name")?;
    scanner.skip_semicolon()?;

    let mut imports = Vec::new();
    while scanner.peek()? == Some(&Token::Ident("import".to_string())) {
        scanner.next()?;
        if scanner.peek()? == Some(&Token::Punct('(')) {
            scanner.next()?;
            loop {
                match scanner.peek()? {
                    Some(Token::Punct(')')) => {
                        scanner.next()?;
                        break;
                    }
                    Some(Token::Punct(';')) => {
                        scanner.next()?;
                    }
                    Some(_) => imports.push(scanner.import_spec()?),
                    None => return Err("import block not terminated".to_string()),
                }
            }
        } else {
            imports.push(scanner.import_spec()?);
        }
        scanner.skip_semicolon()?;
    }

    Ok(GoFileHeader { package, imports })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_grouped_imports() {
        let content = r#"
// Package main does things.
package main

import "fmt"

import (
    "os"
    "path/filepath"

    "github.com/spf13/cobra"
)

func main() {}
"#;
        let header = parse_header(content).unwrap();
        assert_eq!(header.package, "main");
        assert_eq!(
            header.imports,
            vec!["fmt", "os", "path/filepath", "github.com/spf13/cobra"]
        );
    }

    #[test]
    fn test_named_dot_and_blank_imports() {
        let content = r#"package p
import (
    f "fmt"
    . "strings"
    _ "net/http/pprof"
)
"#;
        let header = parse_header(content).unwrap();
        assert_eq!(header.imports, vec!["fmt", "strings", "net/http/pprof"]);
    }

    #[test]
    fn test_cgo_preamble_and_raw_strings() {
        let content = "package p\n\n/*\n#include <stdio.h>\n*/\nimport \"C\"\nimport `unsafe`\n";
        let header = parse_header(content).unwrap();
        assert_eq!(header.imports, vec!["C", "unsafe"]);
        assert!(header.imports_cgo());
    }

    #[test]
    fn test_stops_at_first_declaration() {
        let content = r#"package p

import "fmt"

var s = "import \"os\""

import "never"
"#;
        let header = parse_header(content).unwrap();
        assert_eq!(header.imports, vec!["fmt"]);
    }

    #[test]
    fn test_comments_inside_import_block() {
        let content = r#"package p; import ( "a" /* "b" */ ; "c" // "d"
)"#;
        let header = parse_header(content).unwrap();
        assert_eq!(header.imports, vec!["a", "c"]);
    }

    #[test]
    fn test_no_imports() {
        let header = parse_header("package empty\n\nfunc F() {}\n").unwrap();
        assert_eq!(header.package, "empty");
        assert!(header.imports.is_empty());
        assert!(!header.imports_cgo());
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_header("func main() {}\n").unwrap_err();
        assert!(err.contains("expected 'package'"), "{}", err);
        assert!(parse_header("").is_err());
    }

    #[test]
    fn test_unterminated_import_block() {
        let err = parse_header("package p\nimport (\n\"fmt\"\n").unwrap_err();
        assert!(err.contains("not terminated"), "{}", err);
    }

    #[test]
    fn test_string_escapes_are_decoded() {
        let content = "package p\nimport (\n\t\"\\x41b\\u0063\"\n\t\"\\144\\U00000065\\\\f\"\n)\n";
        let header = parse_header(content).unwrap();
        assert_eq!(header.imports, vec!["Abc", "de\\f"]);
    }

    #[test]
    fn test_bad_string_escapes() {
        let err = parse_header("package p\nimport \"\\q\"\n").unwrap_err();
        assert!(err.contains("unknown escape"), "{}", err);
        let err = parse_header("package p\nimport \"\\x4\"\n").unwrap_err();
        assert!(err.contains("escape sequence"), "{}", err);
        let err = parse_header("package p\nimport \"\\777\"\n").unwrap_err();
        assert!(err.contains("octal"), "{}", err);
    }
}
