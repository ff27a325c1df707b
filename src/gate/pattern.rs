use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Path pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("'**' may only appear as the last segment: {0}")]
    MisplacedRest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` or `:name`, exactly one segment
    Any,
    /// `**` or `:name*`, zero or more trailing segments
    Rest,
}

/// A compiled glob-style path pattern.
///
/// Matching is per segment and ignores empty segments, so `/dashboard/`
/// and `/dashboard` are the same path. `/dashboard/**` matches `/dashboard`
/// itself as well as everything below it. Literal segments compare ASCII
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (index, part) in raw.iter().enumerate() {
            let segment = match *part {
                "**" => Segment::Rest,
                "*" => Segment::Any,
                p if p.starts_with(':') && p.ends_with('*') => Segment::Rest,
                p if p.starts_with(':') => Segment::Any,
                p => Segment::Literal(p.to_string()),
            };
            if segment == Segment::Rest && index + 1 != raw.len() {
                return Err(PatternError::MisplacedRest(pattern.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Test a request path (without query string)
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/').filter(|s| !s.is_empty());

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => match parts.next() {
                    Some(part) if part.eq_ignore_ascii_case(expected) => {}
                    _ => return false,
                },
            }
        }

        parts.next().is_none()
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
