// errors/mod.rs
//! Semantic analysis errors (E2xxx) and warnings (W3xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("no symbol named '{name}' is visible here")]
    #[diagnostic(code(E2001))]
    UndefinedName {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a data object")]
    #[diagnostic(code(E2002))]
    NotAnObject {
        name: String,
        #[label("expected a variable or named constant")]
        span: SourceSpan,
    },

    // Equivalence (E21xx)
    #[error("Derived type component '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2101))]
    EquivalenceComponent {
        name: String,
        #[label("component reference")]
        span: SourceSpan,
    },

    #[error("Dummy argument '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2102))]
    EquivalenceDummy {
        name: String,
        #[label("dummy argument")]
        span: SourceSpan,
    },

    #[error("Function result '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2103))]
    EquivalenceFunctionResult {
        name: String,
        #[label("function result")]
        span: SourceSpan,
    },

    #[error("Pointer '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2104))]
    EquivalencePointer {
        name: String,
        #[label("has the POINTER attribute")]
        span: SourceSpan,
    },

    #[error("Allocatable variable '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2105))]
    EquivalenceAllocatable {
        name: String,
        #[label("has the ALLOCATABLE attribute")]
        span: SourceSpan,
    },

    #[error("Coarray '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2106))]
    EquivalenceCoarray {
        name: String,
        #[label("coarray")]
        span: SourceSpan,
    },

    #[error("Use-associated variable '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2107))]
    EquivalenceUseAssociated {
        name: String,
        #[label("use-associated")]
        span: SourceSpan,
    },

    #[error("Variable '{name}' with BIND attribute is not allowed in an equivalence set")]
    #[diagnostic(code(E2108))]
    EquivalenceBindC {
        name: String,
        #[label("has the BIND attribute")]
        span: SourceSpan,
    },

    #[error("Variable '{name}' with TARGET attribute is not allowed in an equivalence set")]
    #[diagnostic(code(E2109))]
    EquivalenceTarget {
        name: String,
        #[label("has the TARGET attribute")]
        span: SourceSpan,
    },

    #[error("Named constant '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2110))]
    EquivalenceNamedConstant {
        name: String,
        #[label("named constant")]
        span: SourceSpan,
    },

    #[error(
        "Variable '{name}' in common block with BIND attribute is not allowed in an equivalence set"
    )]
    #[diagnostic(code(E2111))]
    EquivalenceBindCommon {
        name: String,
        #[label("in a BIND(C) common block")]
        span: SourceSpan,
    },

    #[error(
        "Derived type object '{name}' with {which} ultimate component is not allowed in an equivalence set"
    )]
    #[diagnostic(code(E2112))]
    EquivalenceIndirectComponent {
        name: String,
        /// "pointer" or "allocatable"
        which: &'static str,
        #[label("component '{component}' is {which}")]
        span: SourceSpan,
        component: String,
    },

    #[error("Nonsequence derived type object '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2113), help("add SEQUENCE to the type definition"))]
    EquivalenceNonSequence {
        name: String,
        #[label("type is not a sequence type")]
        span: SourceSpan,
    },

    #[error("Automatic array '{name}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2114))]
    EquivalenceAutomaticArray {
        name: String,
        #[label("bounds are not constant")]
        span: SourceSpan,
    },

    #[error("Array section '{designator}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2115))]
    EquivalenceArraySection {
        designator: String,
        #[label("section")]
        span: SourceSpan,
    },

    #[error("Array with vector subscript '{subscript}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2116))]
    EquivalenceVectorSubscript {
        subscript: String,
        #[label("vector subscript")]
        span: SourceSpan,
    },

    #[error("Array with nonconstant subscript '{subscript}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2117))]
    EquivalenceNonConstantSubscript {
        subscript: String,
        #[label("not a constant")]
        span: SourceSpan,
    },

    #[error("Coindexed object '{designator}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2118))]
    EquivalenceCoindexed {
        designator: String,
        #[label("coindexed")]
        span: SourceSpan,
    },

    #[error("Substring with nonconstant bound '{bound}' is not allowed in an equivalence set")]
    #[diagnostic(code(E2119))]
    EquivalenceNonConstantSubstring {
        bound: String,
        #[label("not a constant")]
        span: SourceSpan,
    },

    #[error("Substring with zero length is not allowed in an equivalence set")]
    #[diagnostic(code(E2120))]
    EquivalenceZeroLengthSubstring {
        #[label("upper bound is below the start")]
        span: SourceSpan,
    },

    #[error("Equivalence set cannot contain '{first}' with PROTECTED attribute and '{second}' without")]
    #[diagnostic(code(E2121))]
    EquivalenceProtected {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },

    #[error(
        "Equivalence set cannot contain '{first}' that is numeric sequence type and '{second}' that is not"
    )]
    #[diagnostic(code(E2122))]
    EquivalenceNumericSequence {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },

    #[error(
        "Equivalence set cannot contain '{first}' that is character sequence type and '{second}' that is not"
    )]
    #[diagnostic(code(E2123))]
    EquivalenceCharacterSequence {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },

    #[error(
        "Equivalence set cannot contain '{first}' and '{second}' with different types that are neither numeric nor character sequence types"
    )]
    #[diagnostic(code(E2124))]
    EquivalenceTypeMismatch {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },

    #[error("'{first}' and '{second}' cannot have the same first storage unit")]
    #[diagnostic(code(E2125))]
    EquivalenceSameStorageUnit {
        first: String,
        second: String,
        #[label("conflicting equivalence")]
        span: SourceSpan,
    },

    #[error("Equivalence set must have more than one object")]
    #[diagnostic(code(E2126))]
    EquivalenceSingleObject {
        #[label("only one object")]
        span: SourceSpan,
    },

    // Type parameters and instantiation (E22xx)
    #[error("'{name}' is not the name of a parameter for this type")]
    #[diagnostic(code(E2201))]
    NotATypeParameter {
        name: String,
        #[label("unknown type parameter")]
        span: SourceSpan,
    },

    #[error("Type parameter value must have a name")]
    #[diagnostic(code(E2202), help("positional values may not follow keyword values"))]
    TypeParamNeedsName {
        #[label("positional value after keyword value")]
        span: SourceSpan,
    },

    #[error("Too many type parameters given for derived type '{type_name}'")]
    #[diagnostic(code(E2203))]
    TooManyTypeParams {
        type_name: String,
        #[label("extra value")]
        span: SourceSpan,
    },

    #[error("Multiple values given for type parameter '{name}'")]
    #[diagnostic(code(E2204))]
    DuplicateTypeParam {
        name: String,
        #[label("second value")]
        span: SourceSpan,
    },

    #[error("Type parameter '{name}' lacks a value and has no default")]
    #[diagnostic(code(E2205))]
    TypeParamMissing {
        name: String,
        #[label("in this type specifier")]
        span: SourceSpan,
    },

    #[error("Value of type parameter '{name}' ({value}) is not convertible to its type")]
    #[diagnostic(code(E2206))]
    TypeParamNotConvertible {
        name: String,
        value: String,
        #[label("not convertible")]
        span: SourceSpan,
    },

    #[error("Value of kind type parameter '{name}' ({value}) is not a scalar INTEGER constant")]
    #[diagnostic(code(E2207), help("kind type parameters must be known at compile time"))]
    KindParamNotConstant {
        name: String,
        value: String,
        #[label("not constant")]
        span: SourceSpan,
    },

    #[error("KIND parameter value ({kind}) of intrinsic type {category} did not resolve to a supported value")]
    #[diagnostic(code(E2208))]
    UnsupportedKind {
        kind: i64,
        category: String,
        #[label("unsupported kind")]
        span: SourceSpan,
    },

    #[error("KIND parameter of intrinsic type {category} is not a constant in this instance")]
    #[diagnostic(code(E2209))]
    KindNotConstant {
        category: String,
        #[label("kind does not fold")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a derived type")]
    #[diagnostic(code(E2210))]
    NotADerivedType {
        name: String,
        #[label("expected a derived type name")]
        span: SourceSpan,
    },
}

/// Semantic warnings (W3xxx) - these don't prevent compilation but indicate potential issues
/// Note: W3xxx to avoid overlap with E2xxx error codes
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticWarning {
    #[error("Equivalence set contains '{first}' that is numeric sequence type and '{second}' that is character")]
    #[diagnostic(code(W3001))]
    EquivalenceNumericWithCharacter {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },

    #[error("Equivalence set contains '{first}' that is character sequence type and '{second}' that is numeric")]
    #[diagnostic(code(W3002))]
    EquivalenceCharacterWithNumeric {
        first: String,
        second: String,
        #[label]
        span: SourceSpan,
    },
}
