//! Dialect-dependent classification of dot-delimited names.

use crate::options::{LanguageFeature, SemanticsOptions};

/// `.name.` is a defined operator if it is dot-delimited.
pub fn is_defined_operator(name: &str) -> bool {
    name.len() > 1 && name.starts_with('.') && name.ends_with('.')
}

pub fn is_intrinsic_operator(options: &SemanticsOptions, name: &str) -> bool {
    const INTRINSICS: [&str; 11] = [
        ".and.", ".eq.", ".eqv.", ".ge.", ".gt.", ".le.", ".lt.", ".ne.", ".neqv.", ".not.",
        ".or.",
    ];
    if INTRINSICS.contains(&name) {
        return true;
    }
    if options.is_enabled(LanguageFeature::XorOperator) && name == ".xor." {
        return true;
    }
    options.is_enabled(LanguageFeature::LogicalAbbreviations)
        && matches!(name, ".n." | ".a." | ".o." | ".x.")
}

pub fn is_logical_constant(options: &SemanticsOptions, name: &str) -> bool {
    name == ".true."
        || name == ".false."
        || (options.is_enabled(LanguageFeature::LogicalAbbreviations)
            && matches!(name, ".t." | ".f."))
}
