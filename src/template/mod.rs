//! Storage template mini-language.
//!
//! A template is a string of literal path text and `{{token}}` placeholders.
//! `compile` validates every token up front; `render` substitutes them from a
//! [`TemplateContext`] and yields a normalized, slash-joined relative path
//! ending in the asset's lowercased extension. Rendering is deterministic:
//! the same context always produces the same path, and nothing reads the
//! wall clock.

use chrono::{DateTime, Datelike, Utc};
use std::fmt::Write as _;

use crate::errors::TemplateError;
use crate::store::AssetKind;

/// The fixed set of recognized tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Year,
    YearShort,
    Month,
    MonthPadded,
    MonthAbbrev,
    MonthFull,
    Week,
    WeekPadded,
    Day,
    DayPadded,
    Hour12,
    Hour12Padded,
    Hour24,
    Hour24Padded,
    Minute,
    MinutePadded,
    Second,
    SecondPadded,
    Millisecond,
    Filename,
    Extension,
    MediaKindShort,
    MediaKindFull,
    AssetId,
    Album,
}

impl Token {
    fn parse(name: &str) -> Option<Token> {
        Some(match name {
            "y" => Token::Year,
            "yy" => Token::YearShort,
            "M" => Token::Month,
            "MM" => Token::MonthPadded,
            "MMM" => Token::MonthAbbrev,
            "MMMM" => Token::MonthFull,
            "W" => Token::Week,
            "WW" => Token::WeekPadded,
            "d" => Token::Day,
            "dd" => Token::DayPadded,
            "h" => Token::Hour12,
            "hh" => Token::Hour12Padded,
            "H" => Token::Hour24,
            "HH" => Token::Hour24Padded,
            "m" => Token::Minute,
            "mm" => Token::MinutePadded,
            "s" => Token::Second,
            "ss" => Token::SecondPadded,
            "SSS" => Token::Millisecond,
            "filename" => Token::Filename,
            "ext" => Token::Extension,
            "filetype" => Token::MediaKindShort,
            "filetypefull" => Token::MediaKindFull,
            "assetId" => Token::AssetId,
            "album" => Token::Album,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A validated template, ready to render.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// Everything a render needs, derived read-only from an asset and its owner.
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    pub owner_id: &'a str,
    /// Admin-assigned label that replaces the owner id in rendered paths.
    pub storage_label: Option<&'a str>,
    /// Capture time, or the file-modified time when capture time is absent.
    pub timestamp: DateTime<Utc>,
    /// Original filename stem, without extension.
    pub filename: &'a str,
    pub extension: &'a str,
    pub asset_id: &'a str,
    pub kind: AssetKind,
    pub album: Option<&'a str>,
}

impl TemplateContext<'_> {
    /// Path segment identifying the owner: the storage label when set,
    /// otherwise the owner id.
    pub fn owner_segment(&self) -> &str {
        self.storage_label.unwrap_or(self.owner_id)
    }
}

/// Validate `template` against the recognized token set.
/// The first unrecognized or unterminated token fails the whole compilation.
pub fn compile(template: &str) -> Result<CompiledTemplate, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = template;
    let mut consumed = 0usize;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or(TemplateError::UnterminatedToken(consumed + start))?;
        let name = after[..end].trim();
        let token =
            Token::parse(name).ok_or_else(|| TemplateError::UnknownToken(name.to_string()))?;
        segments.push(Segment::Token(token));
        consumed += start + 2 + end + 2;
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(CompiledTemplate {
        raw: template.to_string(),
        segments,
    })
}

impl CompiledTemplate {
    /// The template string this was compiled from.
    pub fn source(&self) -> &str {
        &self.raw
    }

    /// Whether the template references `token` (used to skip album lookups
    /// for templates that never mention `{{album}}`).
    pub fn uses(&self, token: Token) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Token(t) if *t == token))
    }

    /// Render the relative path (including the lowercased extension) for
    /// `ctx`. The result uses `/` separators with empty segments collapsed.
    pub fn render(&self, ctx: &TemplateContext<'_>) -> String {
        let mut out = String::with_capacity(self.raw.len() + ctx.filename.len() + 8);
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Token(t) => resolve(*t, ctx, &mut out),
            }
        }
        let ext = ctx.extension.to_ascii_lowercase();
        let mut path = normalize(&out);
        if !ext.is_empty() {
            let _ = write!(path, ".{}", ext);
        }
        path
    }
}

fn resolve(token: Token, ctx: &TemplateContext<'_>, out: &mut String) {
    let ts = &ctx.timestamp;
    match token {
        Token::Year => {
            let _ = write!(out, "{}", ts.format("%Y"));
        }
        Token::YearShort => {
            let _ = write!(out, "{}", ts.format("%y"));
        }
        Token::Month => {
            let _ = write!(out, "{}", ts.format("%-m"));
        }
        Token::MonthPadded => {
            let _ = write!(out, "{}", ts.format("%m"));
        }
        Token::MonthAbbrev => {
            let _ = write!(out, "{}", ts.format("%b"));
        }
        Token::MonthFull => {
            let _ = write!(out, "{}", ts.format("%B"));
        }
        Token::Week => {
            let _ = write!(out, "{}", ts.iso_week().week());
        }
        Token::WeekPadded => {
            let _ = write!(out, "{:02}", ts.iso_week().week());
        }
        Token::Day => {
            let _ = write!(out, "{}", ts.format("%-d"));
        }
        Token::DayPadded => {
            let _ = write!(out, "{}", ts.format("%d"));
        }
        Token::Hour12 => {
            let _ = write!(out, "{}", ts.format("%-I"));
        }
        Token::Hour12Padded => {
            let _ = write!(out, "{}", ts.format("%I"));
        }
        Token::Hour24 => {
            let _ = write!(out, "{}", ts.format("%-H"));
        }
        Token::Hour24Padded => {
            let _ = write!(out, "{}", ts.format("%H"));
        }
        Token::Minute => {
            let _ = write!(out, "{}", ts.format("%-M"));
        }
        Token::MinutePadded => {
            let _ = write!(out, "{}", ts.format("%M"));
        }
        Token::Second => {
            let _ = write!(out, "{}", ts.format("%-S"));
        }
        Token::SecondPadded => {
            let _ = write!(out, "{}", ts.format("%S"));
        }
        Token::Millisecond => {
            let _ = write!(out, "{}", ts.format("%3f"));
        }
        Token::Filename => out.push_str(&sanitize(ctx.filename)),
        Token::Extension => out.push_str(&ctx.extension.to_ascii_lowercase()),
        Token::MediaKindShort => out.push_str(ctx.kind.short_code()),
        Token::MediaKindFull => out.push_str(ctx.kind.name()),
        Token::AssetId => out.push_str(&sanitize(ctx.asset_id)),
        Token::Album => {
            if let Some(album) = ctx.album {
                out.push_str(&sanitize(album));
            }
        }
    }
}

/// Strip path separators and control characters from a token value so a
/// metadata string can never escape its path segment.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && !c.is_control())
        .collect()
}

/// Collapse repeated or empty `/` segments into a clean relative path.
fn normalize(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
