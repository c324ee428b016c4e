use limn_core::{ModuleName, ResolvedImport};

/// The implicit prelude every module gets unless a name it exposes is
/// shadowed by an explicit import.
///
/// These modules are referenced purely by name; whether they actually
/// resolve to a defining node depends on whether the host's solved
/// dependency set vendors a package providing them. A host that doesn't
/// vendor a prelude package simply gets `None` for every default-imported
/// name, which is the same degraded-but-safe behavior an unresolved
/// explicit import gets.
const PRELUDE_MODULES: &[(&str, &[&str])] = &[
    (
        "Basics",
        &[
            "+", "-", "*", "/", "==", "/=", "<", ">", "<=", ">=", "&&", "||", "not", "identity",
            "always", "Bool", "True", "False", "Int", "Float", "Order", "LT", "EQ", "GT",
        ],
    ),
    ("List", &["List", "map", "filter", "foldl", "foldr", "length", "reverse", "isEmpty"]),
    ("Maybe", &["Maybe", "Just", "Nothing", "withDefault", "map"]),
    ("Result", &["Result", "Ok", "Err", "map", "withDefault"]),
    ("String", &["String", "fromInt", "length", "append"]),
    ("Char", &["Char"]),
    ("Tuple", &["first", "second"]),
];

/// Build the default prelude imports as plain [`ResolvedImport`]s, the
/// same shape an explicit `import Basics exposing (..)` would produce.
pub fn default_imports() -> Vec<ResolvedImport> {
    PRELUDE_MODULES
        .iter()
        .map(|(module, names)| {
            let module_name = ModuleName::new(*module);
            let mut import = ResolvedImport::new(module_name.clone());
            for name in *names {
                import
                    .exposed_locally
                    .insert(name.to_string(), (module_name.clone(), name.to_string()));
            }
            import
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_exposes_basics_unqualified() {
        let imports = default_imports();
        let basics = imports
            .iter()
            .find(|i| i.source_module == ModuleName::new("Basics"))
            .unwrap();
        assert!(basics.exposed_locally.contains_key("identity"));
    }
}
