//! Pathname generator
//!
//! The inverse of the route pattern: fills a segment template with concrete
//! params. Used for prerender output paths and pagination URLs.

use super::{Params, TrailingSlash};
use super::pattern::encode_static;
use crate::error::GenerateError;
use crate::segment::Part;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// `reserved` holds the characters of the surrounding static text when
    /// the segment has more than one param; values must not contain them raw
    Param { name: String, reserved: String },
    /// Emits `/value` or nothing at all
    Rest(String),
}

/// Compiled pathname template for one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGenerator {
    tokens: Vec<Token>,
    trailing_slash: bool,
}

impl RouteGenerator {
    pub fn new(segments: &[Vec<Part>], trailing_slash: TrailingSlash) -> Self {
        let mut tokens = Vec::new();

        for segment in segments {
            match segment.first() {
                Some(Part::Rest(name)) => tokens.push(Token::Rest(name.clone())),
                _ => {
                    let reserved = separators(segment);
                    push_literal(&mut tokens, "/");
                    for part in segment {
                        match part {
                            Part::Static(text) => push_literal(&mut tokens, &encode_static(text)),
                            Part::Param(name) | Part::Rest(name) => tokens.push(Token::Param {
                                name: name.clone(),
                                reserved: reserved.clone(),
                            }),
                        }
                    }
                }
            }
        }

        Self {
            tokens,
            trailing_slash: trailing_slash != TrailingSlash::Never && !segments.is_empty(),
        }
    }

    /// Produces the pathname for `params`
    ///
    /// Named params must be present, non-empty and free of `/`. A rest param
    /// that is absent or empty drops its whole segment.
    ///
    /// In a segment with several params (`[file].[ext]`) any value character
    /// that also occurs in the segment's static text is percent-encoded, so
    /// the value can't be split at the wrong separator when parsed back.
    pub fn generate(&self, params: &Params) -> Result<String, GenerateError> {
        let mut out = String::new();

        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Param { name, reserved } => {
                    let value = lookup(params, name).ok_or_else(|| GenerateError::MissingParam {
                        name: name.clone(),
                    })?;
                    let invalid = || GenerateError::InvalidParam {
                        name: name.clone(),
                        value: value.to_string(),
                    };
                    if value.contains('/') {
                        return Err(invalid());
                    }

                    let encoded = encode_reserved(&urlencoding::encode(value), reserved);
                    // escapes themselves collide with separators made of `%` or hex digits
                    if encoded.chars().any(|c| reserved.contains(c)) {
                        return Err(invalid());
                    }
                    out.push_str(&encoded);
                }
                Token::Rest(name) => {
                    if let Some(value) = lookup(params, name) {
                        out.push('/');
                        let pieces: Vec<String> = value
                            .split('/')
                            .map(|piece| urlencoding::encode(piece).into_owned())
                            .collect();
                        out.push_str(&pieces.join("/"));
                    }
                }
            }
        }

        if self.trailing_slash {
            out.push('/');
        }
        if out.is_empty() {
            out.push('/');
        }

        Ok(out)
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

/// Static characters of a segment with more than one param, else nothing
fn separators(segment: &[Part]) -> String {
    if segment.iter().filter(|part| part.is_dynamic()).count() < 2 {
        return String::new();
    }

    let mut reserved = String::new();
    for part in segment {
        if let Part::Static(text) = part {
            for c in encode_static(text).chars() {
                if !reserved.contains(c) {
                    reserved.push(c);
                }
            }
        }
    }
    reserved
}

/// Percent-encodes the `reserved` characters of an already encoded value
fn encode_reserved(encoded: &str, reserved: &str) -> String {
    if reserved.is_empty() {
        return encoded.to_string();
    }

    let mut out = String::with_capacity(encoded.len());
    for c in encoded.chars() {
        if reserved.contains(c) {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn lookup<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .and_then(|value| value.as_deref())
        .filter(|value| !value.is_empty())
}
