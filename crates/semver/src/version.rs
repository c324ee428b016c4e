use crate::error::Error;
use std::cmp::Ordering;
use std::fmt;
use std::hash;
use std::str::FromStr;

/// A version number conforming to `major.minor.patch`.
///
/// Unlike full SemVer this does not model pre-release or build metadata;
/// the language's package ecosystem compares releases purely on the
/// numeric triple.
#[derive(Clone, Debug)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// The exact text the version was parsed from, kept for display so a
    /// round-tripped manifest doesn't silently normalize whitespace away.
    raw: String,
}

impl Version {
    /// Construct the simple case directly, without going through `parse`.
    pub fn new(major: u64, minor: u64, patch: u64) -> Version {
        let raw = format!("{}.{}.{}", major, minor, patch);
        Version {
            major,
            minor,
            patch,
            raw,
        }
    }

    /// Parse a version of the form `major.minor.patch`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the string does not consist of
    /// exactly three dot-separated components, or [`Error::InvalidComponent`]
    /// if a component is not a non-negative integer.
    pub fn parse(input: &str) -> Result<Version, Error> {
        let trimmed = input.trim();
        let mut parts = trimmed.splitn(3, '.');

        let (Some(major), Some(minor), Some(patch)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidVersion(input.to_string()));
        };

        if parts.next().is_some() {
            return Err(Error::InvalidVersion(input.to_string()));
        }

        let major = parse_component(major)?;
        let minor = parse_component(minor)?;
        let patch = parse_component(patch)?;

        Ok(Version {
            major,
            minor,
            patch,
            raw: trimmed.to_string(),
        })
    }

    /// The triple this version compares by.
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Three-way comparison over the `(major, minor, patch)` triple.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

fn parse_component(s: &str) -> Result<u64, Error> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidComponent(s.to_string()));
    }
    s.parse::<u64>()
        .map_err(|_| Error::InvalidComponent(s.to_string()))
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Version) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Version) -> Ordering {
        self.compare(other)
    }
}

impl hash::Hash for Version {
    fn hash<H: hash::Hasher>(&self, into: &mut H) {
        self.triple().hash(into);
    }
}

impl From<(u64, u64, u64)> for Version {
    fn from(tuple: (u64, u64, u64)) -> Version {
        let (major, minor, patch) = tuple;
        Version::new(major, minor, patch)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triple() {
        assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Version::parse("  1.2.3  ").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn rejects_too_few_components() {
        assert!(matches!(
            Version::parse("1.2"),
            Err(Error::InvalidVersion(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_component() {
        assert!(matches!(
            Version::parse("1.2.foo"),
            Err(Error::InvalidComponent(_))
        ));
    }

    #[test]
    fn orders_lexicographically_by_triple() {
        assert!(Version::new(1, 0, 0) < Version::new(1, 0, 1));
        assert!(Version::new(1, 0, 1) < Version::new(1, 1, 0));
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
        assert_eq!(Version::new(1, 2, 3), Version::new(1, 2, 3));
    }

    #[test]
    fn displays_without_reformatting_zero_padding() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }
}
