use std::fmt;

/// A dotted module identifier, e.g. `Author.Package.Sub`.
///
/// Invariant (enforced by the forest, not this type): globally unique
/// across all writeable trees.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(dotted: impl Into<String>) -> ModuleName {
        ModuleName(dotted.into())
    }

    /// The synthesized name given to a file lacking a module declaration.
    pub fn synthesized_main() -> ModuleName {
        ModuleName("Main".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of a union type's constructors an import/exposing clause
/// brings into scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorExposure {
    /// `T(..)`
    All,
    /// `T(A, B)`
    Some(Vec<String>),
}

/// A single entry of an `exposing (...)` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExposedItem {
    Value(String),
    Operator(String),
    Type {
        name: String,
        constructors: Option<ConstructorExposure>,
    },
}

impl ExposedItem {
    pub fn name(&self) -> &str {
        match self {
            ExposedItem::Value(name) => name,
            ExposedItem::Operator(name) => name,
            ExposedItem::Type { name, .. } => name,
        }
    }
}

/// A module's exposing clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExposingSet {
    /// The wildcard form, `exposing (..)` at the module level.
    All,
    Explicit(Vec<ExposedItem>),
}

impl ExposingSet {
    /// Whether a plain value/operator/type name is exposed by this set.
    /// Does not itself resolve constructor exposure for union types; see
    /// [`ExposingSet::exposes_constructor`].
    pub fn exposes(&self, name: &str) -> bool {
        match self {
            ExposingSet::All => true,
            ExposingSet::Explicit(items) => items.iter().any(|item| item.name() == name),
        }
    }

    /// Whether constructor `ctor` of union type `type_name` is exposed.
    pub fn exposes_constructor(&self, type_name: &str, ctor: &str) -> bool {
        match self {
            ExposingSet::All => true,
            ExposingSet::Explicit(items) => items.iter().any(|item| match item {
                ExposedItem::Type { name, constructors } if name == type_name => {
                    match constructors {
                        Some(ConstructorExposure::All) => true,
                        Some(ConstructorExposure::Some(names)) => {
                            names.iter().any(|n| n == ctor)
                        }
                        None => false,
                    }
                }
                _ => false,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_set_only_exposes_listed_names() {
        let set = ExposingSet::Explicit(vec![ExposedItem::Value("x".to_string())]);
        assert!(set.exposes("x"));
        assert!(!set.exposes("y"));
    }

    #[test]
    fn all_constructors_form_exposes_everything() {
        let set = ExposingSet::Explicit(vec![ExposedItem::Type {
            name: "Maybe".to_string(),
            constructors: Some(ConstructorExposure::All),
        }]);
        assert!(set.exposes_constructor("Maybe", "Just"));
        assert!(set.exposes_constructor("Maybe", "Nothing"));
    }

    #[test]
    fn partial_constructors_form_limits_exposure() {
        let set = ExposingSet::Explicit(vec![ExposedItem::Type {
            name: "Maybe".to_string(),
            constructors: Some(ConstructorExposure::Some(vec!["Just".to_string()])),
        }]);
        assert!(set.exposes_constructor("Maybe", "Just"));
        assert!(!set.exposes_constructor("Maybe", "Nothing"));
    }
}
