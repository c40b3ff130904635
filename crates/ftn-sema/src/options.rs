//! Inputs that change which programs are accepted.
//!
//! Options are fixed once a `SemanticsContext` is created.

use smallvec::SmallVec;

use crate::types::TypeCategory;

/// Dialect features that can be enabled or warned about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFeature {
    /// Numeric and character sequence objects in one equivalence set
    EquivalenceNumericWithCharacter,
    /// `.t.`/`.f.` constants and `.n.`/`.a.`/`.o.`/`.x.` operators
    LogicalAbbreviations,
    /// `.xor.` as an intrinsic operator
    XorOperator,
}

impl LanguageFeature {
    const ALL: [LanguageFeature; 3] = [
        LanguageFeature::EquivalenceNumericWithCharacter,
        LanguageFeature::LogicalAbbreviations,
        LanguageFeature::XorOperator,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Compact set of features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FeatureSet(u8);

impl FeatureSet {
    fn insert(&mut self, feature: LanguageFeature) {
        self.0 |= feature.bit();
    }

    fn remove(&mut self, feature: LanguageFeature) {
        self.0 &= !feature.bit();
    }

    fn contains(self, feature: LanguageFeature) -> bool {
        self.0 & feature.bit() != 0
    }
}

#[derive(Debug, Clone)]
pub struct SemanticsOptions {
    enabled: FeatureSet,
    warned: FeatureSet,
    default_kinds: SmallVec<[(TypeCategory, i64); 5]>,
    double_precision_kind: i64,
}

impl Default for SemanticsOptions {
    fn default() -> Self {
        SemanticsOptions::builder().build()
    }
}

impl SemanticsOptions {
    pub fn builder() -> SemanticsOptionsBuilder {
        SemanticsOptionsBuilder::new()
    }

    pub fn is_enabled(&self, feature: LanguageFeature) -> bool {
        self.enabled.contains(feature)
    }

    /// Whether a use of an enabled feature should still produce a warning.
    pub fn should_warn(&self, feature: LanguageFeature) -> bool {
        self.warned.contains(feature)
    }

    pub fn default_kind(&self, category: TypeCategory) -> i64 {
        self.default_kinds
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, kind)| *kind)
            .unwrap_or_else(|| panic!("no default kind for {:?}", category))
    }

    pub fn double_precision_kind(&self) -> i64 {
        self.double_precision_kind
    }

    /// Kind of the integer type used for subscripts and bounds.
    pub fn subscript_integer_kind(&self) -> i64 {
        8
    }

    pub fn enabled_features(&self) -> impl Iterator<Item = LanguageFeature> + '_ {
        LanguageFeature::ALL
            .into_iter()
            .filter(|feature| self.is_enabled(*feature))
    }
}

/// Builder for `SemanticsOptions`.
pub struct SemanticsOptionsBuilder {
    options: SemanticsOptions,
}

impl SemanticsOptionsBuilder {
    /// Every feature enabled; the numeric/character overlap warns.
    pub fn new() -> Self {
        let mut enabled = FeatureSet::default();
        for feature in LanguageFeature::ALL {
            enabled.insert(feature);
        }
        let mut warned = FeatureSet::default();
        warned.insert(LanguageFeature::EquivalenceNumericWithCharacter);
        Self {
            options: SemanticsOptions {
                enabled,
                warned,
                default_kinds: SmallVec::from_buf([
                    (TypeCategory::Integer, 4),
                    (TypeCategory::Real, 4),
                    (TypeCategory::Complex, 4),
                    (TypeCategory::Character, 1),
                    (TypeCategory::Logical, 4),
                ]),
                double_precision_kind: 8,
            },
        }
    }

    pub fn enable(mut self, feature: LanguageFeature) -> Self {
        self.options.enabled.insert(feature);
        self
    }

    pub fn disable(mut self, feature: LanguageFeature) -> Self {
        self.options.enabled.remove(feature);
        self.options.warned.remove(feature);
        self
    }

    pub fn warn_on(mut self, feature: LanguageFeature) -> Self {
        self.options.enabled.insert(feature);
        self.options.warned.insert(feature);
        self
    }

    pub fn no_warn(mut self, feature: LanguageFeature) -> Self {
        self.options.warned.remove(feature);
        self
    }

    /// Override the default kind of an intrinsic category.
    pub fn default_kind(mut self, category: TypeCategory, kind: i64) -> Self {
        assert!(
            category != TypeCategory::Derived,
            "derived types have no kind"
        );
        match self
            .options
            .default_kinds
            .iter_mut()
            .find(|(c, _)| *c == category)
        {
            Some(entry) => entry.1 = kind,
            None => self.options.default_kinds.push((category, kind)),
        }
        self
    }

    pub fn double_precision_kind(mut self, kind: i64) -> Self {
        self.options.double_precision_kind = kind;
        self
    }

    pub fn build(self) -> SemanticsOptions {
        self.options
    }
}

impl Default for SemanticsOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
