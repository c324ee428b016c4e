/// A grammar-intrinsic type with no source definition anywhere in the
/// forest, e.g. `List`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyType {
    pub name: &'static str,
    pub markdown: &'static str,
}

const EMPTY_TYPES: &[EmptyType] = &[
    EmptyType {
        name: "List",
        markdown: "A singly linked list, built into the grammar rather than defined in any module.",
    },
    EmptyType {
        name: "Array",
        markdown: "An indexed, immutable array, built into the grammar.",
    },
    EmptyType {
        name: "Dict",
        markdown: "A key-value dictionary, built into the grammar.",
    },
    EmptyType {
        name: "Set",
        markdown: "A collection of unique values, built into the grammar.",
    },
    EmptyType {
        name: "String",
        markdown: "A UTF-8 string, built into the grammar.",
    },
    EmptyType {
        name: "Char",
        markdown: "A single Unicode scalar value, built into the grammar.",
    },
    EmptyType {
        name: "Int",
        markdown: "An arbitrary-precision integer, built into the grammar.",
    },
    EmptyType {
        name: "Float",
        markdown: "A 64-bit floating point number, built into the grammar.",
    },
    EmptyType {
        name: "Bool",
        markdown: "A two-valued boolean, built into the grammar.",
    },
];

/// The constant list of grammar-intrinsic types.
pub fn empty_types() -> &'static [EmptyType] {
    EMPTY_TYPES
}
