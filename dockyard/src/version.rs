//! Artifact versions.
//!
//! Releases and stemcells carry free-form version strings such as `1`,
//! `3586.25`, `1.0-dev.3` or `2+build.1`. Retention needs a total order
//! over them, which is what [`Version`] provides.
//!
//! ## Ordering
//!
//! A version is made of a release part, an optional pre-release part
//! (after the first `-`) and an optional post-release part (after the
//! first `+`). Each part is a list of dot-separated segments.
//!
//! - Numeric segments compare numerically regardless of their length,
//!   alphanumeric segments compare lexically, and a numeric segment is
//!   always lower than an alphanumeric one.
//! - Missing trailing segments compare as `0`, so `1` and `1.0` are equal.
//! - A pre-release sorts before the release it precedes (`1.0-dev.3 < 1.0`).
//! - A post-release sorts after it (`1.0 < 1.0+build.1`).
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Serialize};

use crate::error::{DockyardError, DockyardResult};

lazy_static! {
    static ref SEGMENT_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// A parsed version string.
#[derive(Clone, Debug)]
pub struct Version {
    /// The original string.
    raw: String,

    release: Vec<Segment>,
    pre_release: Option<Vec<Segment>>,
    post_release: Option<Vec<Segment>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    /// Decimal digits without leading zeroes.
    Numeric(String),
    Alpha(String),
}

impl Segment {
    fn zero() -> Self {
        Self::Numeric(String::new())
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Without leading zeroes the longer number is the larger one
            (Self::Numeric(a), Self::Numeric(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Version {
    /// Parses a version string.
    pub fn parse(version: &str) -> DockyardResult<Self> {
        let invalid = |reason| DockyardError::InvalidVersion {
            version: version.to_owned(),
            reason,
        };

        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(invalid("Version is empty"));
        }

        let (rest, post) = match trimmed.split_once('+') {
            Some((rest, post)) => (rest, Some(post)),
            None => (trimmed, None),
        };

        let (release, pre) = match rest.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (rest, None),
        };

        let release = parse_segments(release).ok_or_else(|| invalid("Invalid release segment"))?;
        let pre_release = pre
            .map(|p| parse_segments(p).ok_or_else(|| invalid("Invalid pre-release segment")))
            .transpose()?;
        let post_release = post
            .map(|p| parse_segments(p).ok_or_else(|| invalid("Invalid post-release segment")))
            .transpose()?;

        Ok(Self {
            raw: version.to_owned(),
            release,
            pre_release,
            post_release,
        })
    }

    /// Returns the original version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_segments(s: &str) -> Option<Vec<Segment>> {
    s.split('.')
        .map(|segment| {
            if !SEGMENT_REGEX.is_match(segment) {
                return None;
            }

            Some(if segment.bytes().all(|b| b.is_ascii_digit()) {
                Segment::Numeric(segment.trim_start_matches('0').to_owned())
            } else {
                Segment::Alpha(segment.to_owned())
            })
        })
        .collect()
}

fn cmp_segments(a: &[Segment], b: &[Segment]) -> Ordering {
    let zero = Segment::zero();
    let len = a.len().max(b.len());

    for i in 0..len {
        let x = a.get(i).unwrap_or(&zero);
        let y = b.get(i).unwrap_or(&zero);

        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_segments(&self.release, &other.release)
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => cmp_segments(a, b),
            })
            .then_with(|| match (&self.post_release, &other.post_release) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (Some(a), Some(b)) => cmp_segments(a, b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = DockyardError;

    fn from_str(s: &str) -> DockyardResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        use de::Error;
        String::deserialize(deserializer)
            .and_then(|s| Self::parse(&s).map_err(|e| Error::custom(e.to_string())))
    }
}
