use crate::error::Error;
use crate::version::Version;
use std::cmp::Ordering;
use std::fmt;

/// A comparison operator bounding one side of a [`Constraint`].
///
/// The algebra only ever needs strict-less-than and less-or-equal: every
/// half-open interval is expressed in terms of these two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Lt,
    Le,
}

impl Op {
    /// When two bounds land on the same version, the strict operator wins.
    fn tighter(self, other: Op) -> Op {
        match (self, other) {
            (Op::Lt, _) | (_, Op::Lt) => Op::Lt,
            (Op::Le, Op::Le) => Op::Le,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Lt => write!(f, "<"),
            Op::Le => write!(f, "<="),
        }
    }
}

/// A half-open interval `lower <op1> v <op2> upper`.
///
/// Invariant: `lower < upper`. A [`Constraint`] is never constructed
/// representing an empty or single-point interval; [`Constraint::new`] and
/// [`Constraint::intersect`] both enforce this by returning `None`/`Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    lower_op: Op,
    lower: Version,
    upper_op: Op,
    upper: Version,
}

impl Constraint {
    /// Build a constraint `lower <lower_op> v <upper_op> upper`.
    pub fn new(lower_op: Op, lower: Version, upper_op: Op, upper: Version) -> Result<Self, Error> {
        if lower >= upper {
            return Err(Error::EmptyInterval {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }

        Ok(Constraint {
            lower_op,
            lower,
            upper_op,
            upper,
        })
    }

    pub fn lower(&self) -> &Version {
        &self.lower
    }

    pub fn upper(&self) -> &Version {
        &self.upper
    }

    /// Whether `v` falls within this constraint's interval.
    pub fn satisfies(&self, v: &Version) -> bool {
        let lower_ok = match self.lower_op {
            Op::Lt => &self.lower < v,
            Op::Le => &self.lower <= v,
        };
        let upper_ok = match self.upper_op {
            Op::Lt => v < &self.upper,
            Op::Le => v <= &self.upper,
        };
        lower_ok && upper_ok
    }

    /// Intersect two constraints, returning `None` if the result would be
    /// empty.
    ///
    /// The new lower bound is the max of the two lowers (ties broken by the
    /// stricter operator); the new upper bound is the min of the two
    /// uppers, ties broken the same way.
    pub fn intersect(&self, other: &Constraint) -> Option<Constraint> {
        let (lower, lower_op) = match self.lower.cmp(&other.lower) {
            Ordering::Greater => (self.lower.clone(), self.lower_op),
            Ordering::Less => (other.lower.clone(), other.lower_op),
            Ordering::Equal => (self.lower.clone(), self.lower_op.tighter(other.lower_op)),
        };

        let (upper, upper_op) = match self.upper.cmp(&other.upper) {
            Ordering::Less => (self.upper.clone(), self.upper_op),
            Ordering::Greater => (other.upper.clone(), other.upper_op),
            Ordering::Equal => (self.upper.clone(), self.upper_op.tighter(other.upper_op)),
        };

        if lower >= upper {
            return None;
        }

        Some(Constraint {
            lower_op,
            lower,
            upper_op,
            upper,
        })
    }

    /// Parse the manifest-facing textual form, e.g. `>=1.0.0 <2.0.0` or
    /// `>1.0.0 <=2.0.0`. The first predicate bounds the interval from
    /// below (`>` or `>=`), the second from above (`<` or `<=`); this is
    /// the `LOWER OP v OP UPPER` shape manifests write constraints in.
    pub fn parse(input: &str) -> Result<Constraint, Error> {
        let trimmed = input.trim();
        let mut parts = trimmed.split_whitespace();

        let (Some(lower_part), Some(upper_part)) = (parts.next(), parts.next()) else {
            return Err(Error::InvalidConstraint(input.to_string()));
        };
        if parts.next().is_some() {
            return Err(Error::InvalidConstraint(input.to_string()));
        }

        let (lower_op, lower_rest) = split_lower_operator(lower_part, input)?;
        let (upper_op, upper_rest) = split_upper_operator(upper_part, input)?;

        let lower = Version::parse(lower_rest).map_err(|_| Error::InvalidConstraint(input.to_string()))?;
        let upper = Version::parse(upper_rest).map_err(|_| Error::InvalidConstraint(input.to_string()))?;

        Constraint::new(lower_op, lower, upper_op, upper)
            .map_err(|_| Error::InvalidConstraint(input.to_string()))
    }
}

fn split_lower_operator<'a>(token: &'a str, whole: &str) -> Result<(Op, &'a str), Error> {
    if let Some(rest) = token.strip_prefix(">=") {
        Ok((Op::Le, rest))
    } else if let Some(rest) = token.strip_prefix('>') {
        Ok((Op::Lt, rest))
    } else {
        Err(Error::InvalidConstraint(whole.to_string()))
    }
}

fn split_upper_operator<'a>(token: &'a str, whole: &str) -> Result<(Op, &'a str), Error> {
    if let Some(rest) = token.strip_prefix("<=") {
        Ok((Op::Le, rest))
    } else if let Some(rest) = token.strip_prefix('<') {
        Ok((Op::Lt, rest))
    } else {
        Err(Error::InvalidConstraint(whole.to_string()))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} v {} {}",
            self.lower, self.lower_op, self.upper_op, self.upper
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format!(
            ">={} <{}{}",
            self.lower,
            if self.upper_op == Op::Le { "=" } else { "" },
            self.upper
        ))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Constraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Constraint::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u64, minor: u64, patch: u64) -> Version {
        Version::new(major, minor, patch)
    }

    #[test]
    fn parses_inclusive_lower_exclusive_upper() {
        let c = Constraint::parse(">=1.0.0 <2.0.0").unwrap();
        assert!(c.satisfies(&v(1, 0, 0)));
        assert!(c.satisfies(&v(1, 9, 9)));
        assert!(!c.satisfies(&v(2, 0, 0)));
        assert!(!c.satisfies(&v(0, 9, 9)));
    }

    #[test]
    fn parses_strict_lower_inclusive_upper() {
        let c = Constraint::parse(">1.0.0 <=2.0.0").unwrap();
        assert!(!c.satisfies(&v(1, 0, 0)));
        assert!(c.satisfies(&v(1, 0, 1)));
        assert!(c.satisfies(&v(2, 0, 0)));
    }

    #[test]
    fn rejects_inverted_interval() {
        assert!(Constraint::parse(">=2.0.0 <1.0.0").is_err());
    }

    #[test]
    fn rejects_single_point_interval() {
        assert!(Constraint::parse(">=1.0.0 <1.0.0").is_err());
    }

    #[test]
    fn satisfies_self_intersect_is_identity() {
        let c = Constraint::parse(">=1.0.0 <2.0.0").unwrap();
        let intersected = c.intersect(&c).unwrap();
        for (major, minor, patch) in [(0, 9, 9), (1, 0, 0), (1, 5, 0), (2, 0, 0)] {
            let candidate = v(major, minor, patch);
            assert_eq!(c.satisfies(&candidate), intersected.satisfies(&candidate));
        }
    }

    #[test]
    fn intersect_narrows_to_overlap() {
        let a = Constraint::parse(">=1.0.0 <2.0.0").unwrap();
        let b = Constraint::parse(">=1.2.0 <=3.0.0").unwrap();
        let expected = Constraint::parse(">=1.2.0 <2.0.0").unwrap();
        assert_eq!(a.intersect(&b).unwrap(), expected);
        assert_eq!(b.intersect(&a).unwrap(), expected);
    }

    #[test]
    fn intersect_is_commutative() {
        let a = Constraint::parse(">=1.0.0 <3.0.0").unwrap();
        let b = Constraint::parse(">1.5.0 <2.5.0").unwrap();
        assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn intersect_is_associative() {
        let a = Constraint::parse(">=1.0.0 <5.0.0").unwrap();
        let b = Constraint::parse(">=2.0.0 <4.0.0").unwrap();
        let c = Constraint::parse(">=1.5.0 <3.5.0").unwrap();

        let left = a.intersect(&b).and_then(|ab| ab.intersect(&c));
        let right = b.intersect(&c).and_then(|bc| a.intersect(&bc));
        assert_eq!(left, right);
    }

    #[test]
    fn intersect_empty_when_ranges_dont_overlap() {
        let a = Constraint::parse(">=1.0.0 <2.0.0").unwrap();
        let b = Constraint::parse(">=2.0.0 <3.0.0").unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn satisfies_intersect_iff_satisfies_both() {
        let a = Constraint::parse(">=1.0.0 <3.0.0").unwrap();
        let b = Constraint::parse(">=2.0.0 <4.0.0").unwrap();
        let intersected = a.intersect(&b).unwrap();

        for (major, minor, patch) in [(0, 5, 0), (1, 5, 0), (2, 5, 0), (3, 5, 0), (4, 5, 0)] {
            let candidate = v(major, minor, patch);
            assert_eq!(
                intersected.satisfies(&candidate),
                a.satisfies(&candidate) && b.satisfies(&candidate)
            );
        }
    }
}
