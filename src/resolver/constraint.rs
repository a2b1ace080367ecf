//! Build constraint evaluation
//!
//! Decides whether a Go source file is part of the build for a given
//! [`BuildContext`], from its `//go:build` / `// +build` header lines and from
//! `_GOOS` / `_GOARCH` file name suffixes.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::config::{BuildContext, KNOWN_ARCH, KNOWN_OS};

static GO_BUILD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^//go:build(?:[ \t](.*))?$").expect("GO_BUILD_LINE regex is invalid")
});

static PLUS_BUILD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^//\s*\+build(?:\s+(.*))?$").expect("PLUS_BUILD_LINE regex is invalid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parsing //go:build line: {0}")]
pub struct ConstraintError(String);

/// A parsed build constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn eval(&self, ok: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Expr::Tag(tag) => ok(tag),
            Expr::Not(inner) => !inner.eval(ok),
            Expr::And(a, b) => a.eval(ok) && b.eval(ok),
            Expr::Or(a, b) => a.eval(ok) || b.eval(ok),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ConstraintError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '!' => tokens.push(Token::Not),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '&' | '|' => {
                if chars.next_if(|&(_, next)| next == c).is_none() {
                    return Err(ConstraintError(format!("unexpected {}", c)));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if is_tag_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some((i, next)) = chars.next_if(|&(_, next)| is_tag_char(next)) {
                    end = i + next.len_utf8();
                }
                tokens.push(Token::Tag(src[start..end].to_string()));
            }
            other => return Err(ConstraintError(format!("invalid syntax at {}", other))),
        }
    }
    Ok(tokens)
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Recursive descent over `||`, `&&`, `!` and parentheses.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn or(&mut self) -> Result<Expr, ConstraintError> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, ConstraintError> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, ConstraintError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, ConstraintError> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(ConstraintError("missing )".to_string())),
                }
            }
            Some(Token::Tag(tag)) => Ok(Expr::Tag(tag)),
            Some(_) => Err(ConstraintError("unexpected operator".to_string())),
            None => Err(ConstraintError("unexpected end of expression".to_string())),
        }
    }
}

/// Parse the expression following `//go:build`.
pub fn parse_expr(src: &str) -> Result<Expr, ConstraintError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ConstraintError("empty expression".to_string()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    if parser.pos != parser.tokens.len() {
        return Err(ConstraintError("unexpected token after expression".to_string()));
    }
    Ok(expr)
}

/// Evaluate the arguments of a legacy `// +build` line: space-separated
/// options are ORed, comma-separated terms ANDed, `!` negates.
fn eval_plus_build(args: &str, ctx: &BuildContext) -> bool {
    args.split_whitespace().any(|option| {
        option.split(',').all(|term| {
            let (negated, tag) = match term.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, term),
            };
            // "!!x" and empty terms never match
            if tag.is_empty() || tag.starts_with('!') || !tag.chars().all(is_tag_char) {
                return false;
            }
            ctx.matches_tag(tag) != negated
        })
    })
}

/// Comment lines of the file header, i.e. everything before the package
/// clause, together with the index of the last blank line seen.
fn header_comments(content: &str) -> (Vec<(usize, &str)>, Option<usize>) {
    let mut comments = Vec::new();
    let mut last_blank = None;
    let mut in_block = false;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if in_block {
            if let Some(idx) = trimmed.find("*/") {
                in_block = false;
                let rest = trimmed[idx + 2..].trim();
                if !rest.is_empty() && !rest.starts_with("//") {
                    break;
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            last_blank = Some(i);
        } else if trimmed.starts_with("//") {
            comments.push((i, trimmed));
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            match rest.find("*/") {
                Some(idx) => {
                    let after = rest[idx + 2..].trim();
                    if !after.is_empty() && !after.starts_with("//") {
                        break;
                    }
                }
                None => in_block = true,
            }
        } else {
            break;
        }
    }

    (comments, last_blank)
}

/// Report whether the header of `content` allows the file in `ctx`.
pub fn should_build(content: &str, ctx: &BuildContext) -> Result<bool, ConstraintError> {
    let (comments, last_blank) = header_comments(content);

    let mut go_build = None;
    for &(_, line) in &comments {
        if let Some(caps) = GO_BUILD_LINE.captures(line) {
            if go_build.is_some() {
                return Err(ConstraintError("multiple //go:build comments".to_string()));
            }
            go_build = Some(caps.get(1).map_or("", |m| m.as_str()).to_string());
        }
    }

    if let Some(src) = go_build {
        let expr = parse_expr(&src)?;
        return Ok(expr.eval(&|tag| ctx.matches_tag(tag)));
    }

    // +build lines only count when a blank line separates them from the
    // package clause.
    let Some(last_blank) = last_blank else {
        return Ok(true);
    };
    for &(i, line) in &comments {
        if i >= last_blank {
            break;
        }
        if let Some(caps) = PLUS_BUILD_LINE.captures(line) {
            let args = caps.get(1).map_or("", |m| m.as_str());
            if !eval_plus_build(args, ctx) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Check `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` suffixes of a file name.
pub fn matches_file_name(name: &str, ctx: &BuildContext) -> bool {
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
    let Some((_, suffixes)) = stem.split_once('_') else {
        return true;
    };

    let mut parts: Vec<&str> = suffixes.split('_').collect();
    if parts.last() == Some(&"test") {
        parts.pop();
    }

    let n = parts.len();
    if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
        return ctx.matches_tag(parts[n - 2]) && ctx.matches_tag(parts[n - 1]);
    }
    if n >= 1 {
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return ctx.matches_tag(last);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BuildContext {
        BuildContext::default()
            .with_target("linux", "amd64")
            .with_cgo(false)
    }

    fn eval(src: &str, ctx: &BuildContext) -> bool {
        parse_expr(src).unwrap().eval(&|tag| ctx.matches_tag(tag))
    }

    #[test]
    fn test_parse_expr_precedence() {
        let expr = parse_expr("a || b && !c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(
                Box::new(Expr::Tag("a".into())),
                Box::new(Expr::And(
                    Box::new(Expr::Tag("b".into())),
                    Box::new(Expr::Not(Box::new(Expr::Tag("c".into())))),
                )),
            )
        );
    }

    #[test]
    fn test_eval_expr() {
        let ctx = ctx();
        assert!(eval("linux", &ctx));
        assert!(eval("linux && amd64", &ctx));
        assert!(!eval("linux && arm64", &ctx));
        assert!(eval("windows || (linux && !cgo)", &ctx));
        assert!(!eval("!unix", &ctx));
        assert!(eval("go1.18", &ctx));
    }

    #[test]
    fn test_parse_expr_errors() {
        assert!(parse_expr("").is_err());
        assert!(parse_expr("linux &&").is_err());
        assert!(parse_expr("(linux").is_err());
        assert!(parse_expr("linux & amd64").is_err());
        assert!(parse_expr("linux amd64").is_err());
        assert!(parse_expr("lin-ux").is_err());
    }

    #[test]
    fn test_should_build_go_build_line() {
        let ctx = ctx();
        let src = "//go:build windows\n\npackage foo\n";
        assert!(!should_build(src, &ctx).unwrap());

        let src = "// Copyright\n\n//go:build linux\n\npackage foo\n";
        assert!(should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_go_build_overrides_plus_build() {
        let ctx = ctx();
        let src = "//go:build linux\n// +build windows\n\npackage foo\n";
        assert!(should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_plus_build_lines() {
        let ctx = ctx();
        assert!(should_build("// +build linux darwin\n\npackage foo\n", &ctx).unwrap());
        assert!(!should_build("// +build windows\n\npackage foo\n", &ctx).unwrap());
        assert!(!should_build("// +build linux,arm64\n\npackage foo\n", &ctx).unwrap());
        assert!(should_build("// +build !windows\n\npackage foo\n", &ctx).unwrap());
        // Multiple lines are ANDed
        let src = "// +build linux\n// +build ignore\n\npackage foo\n";
        assert!(!should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_plus_build_needs_blank_line() {
        let ctx = ctx();
        // Without a blank line before the package clause it is a doc comment
        let src = "// +build windows\npackage foo\n";
        assert!(should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_constraints_after_package_clause_ignored() {
        let ctx = ctx();
        let src = "package foo\n\n//go:build windows\n";
        assert!(should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_block_comment_in_header() {
        let ctx = ctx();
        let src = "/* license\n   text */\n\n//go:build ignore\n\npackage foo\n";
        assert!(!should_build(src, &ctx).unwrap());
    }

    #[test]
    fn test_user_tags_enable_files() {
        let src = "//go:build integration\n\npackage foo\n";
        assert!(!should_build(src, &ctx()).unwrap());
        let tagged = ctx().with_build_tags("integration");
        assert!(should_build(src, &tagged).unwrap());
    }

    #[test]
    fn test_multiple_go_build_lines_rejected() {
        let src = "//go:build linux\n//go:build amd64\n\npackage foo\n";
        assert!(should_build(src, &ctx()).is_err());
    }

    #[test]
    fn test_matches_file_name() {
        let ctx = ctx();
        assert!(matches_file_name("main.go", &ctx));
        assert!(matches_file_name("linux.go", &ctx));
        assert!(matches_file_name("file_linux.go", &ctx));
        assert!(!matches_file_name("file_windows.go", &ctx));
        assert!(matches_file_name("file_amd64.go", &ctx));
        assert!(!matches_file_name("file_arm64.go", &ctx));
        assert!(matches_file_name("file_linux_amd64.go", &ctx));
        assert!(!matches_file_name("file_linux_arm64.go", &ctx));
        assert!(!matches_file_name("file_windows_test.go", &ctx));
        assert!(matches_file_name("some_helper.go", &ctx));
    }

    #[test]
    fn test_file_suffix_stops_at_first_dot() {
        let ctx = ctx();
        assert!(matches_file_name("x.pb_windows.go", &ctx));
        assert!(!matches_file_name("x_windows.pb.go", &ctx));
        assert!(matches_file_name("x_linux.pb.go", &ctx));
    }

    #[test]
    fn test_unix_is_not_a_file_suffix() {
        // Only GOOS/GOARCH names are special in file names
        let ctx = BuildContext::default().with_target("windows", "amd64");
        assert!(matches_file_name("file_unix.go", &ctx));
    }
}
