//! Normalized array and coarray shapes.

use crate::evaluate::{self, Expr};

/// One bound of one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// Written bound. None when it did not resolve to a scalar integer.
    Explicit(Option<Expr>),
    /// `*`
    Assumed,
    /// `:`
    Deferred,
}

impl Bound {
    pub fn constant(value: i64) -> Self {
        Bound::Explicit(Some(Expr::int(value, 8)))
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Bound::Explicit(_))
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, Bound::Assumed)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Bound::Deferred)
    }

    pub fn explicit(&self) -> Option<&Expr> {
        match self {
            Bound::Explicit(expr) => expr.as_ref(),
            _ => None,
        }
    }

    pub fn explicit_mut(&mut self) -> Option<&mut Expr> {
        match self {
            Bound::Explicit(expr) => expr.as_mut(),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<i64> {
        self.explicit().and_then(evaluate::to_int64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeSpec {
    pub lbound: Bound,
    pub ubound: Bound,
}

impl ShapeSpec {
    pub fn explicit(lbound: Bound, ubound: Bound) -> Self {
        Self { lbound, ubound }
    }

    /// `lb:` on a dummy argument
    pub fn assumed(lbound: Bound) -> Self {
        Self {
            lbound,
            ubound: Bound::Deferred,
        }
    }

    pub fn deferred() -> Self {
        Self {
            lbound: Bound::Deferred,
            ubound: Bound::Deferred,
        }
    }

    /// `lb:*`
    pub fn implied(lbound: Bound) -> Self {
        Self {
            lbound,
            ubound: Bound::Assumed,
        }
    }

    pub fn assumed_rank() -> Self {
        Self {
            lbound: Bound::Assumed,
            ubound: Bound::Assumed,
        }
    }
}

/// A list of dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArraySpec(Vec<ShapeSpec>);

impl ArraySpec {
    pub fn new(dims: Vec<ShapeSpec>) -> Self {
        Self(dims)
    }

    pub fn push(&mut self, dim: ShapeSpec) {
        self.0.push(dim);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShapeSpec> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ShapeSpec> {
        self.0.iter_mut()
    }

    pub fn rank(&self) -> usize {
        if self.is_assumed_rank() {
            0
        } else {
            self.0.len()
        }
    }

    pub fn is_explicit_shape(&self) -> bool {
        self.0
            .iter()
            .all(|dim| dim.lbound.is_explicit() && dim.ubound.is_explicit())
    }

    pub fn is_assumed_shape(&self) -> bool {
        !self.is_empty()
            && self
                .0
                .iter()
                .all(|dim| dim.lbound.is_explicit() && dim.ubound.is_deferred())
    }

    pub fn is_deferred_shape(&self) -> bool {
        !self.is_empty()
            && self
                .0
                .iter()
                .all(|dim| dim.lbound.is_deferred() && dim.ubound.is_deferred())
    }

    pub fn is_implied_shape(&self) -> bool {
        !self.is_empty()
            && !self.is_assumed_rank()
            && self.0.iter().all(|dim| dim.ubound.is_assumed())
    }

    /// Explicit dimensions followed by one `lb:*`.
    pub fn is_assumed_size(&self) -> bool {
        match self.0.split_last() {
            Some((last, rest)) => {
                !self.is_assumed_rank()
                    && last.lbound.is_explicit()
                    && last.ubound.is_assumed()
                    && rest
                        .iter()
                        .all(|dim| dim.lbound.is_explicit() && dim.ubound.is_explicit())
            }
            None => false,
        }
    }

    pub fn is_assumed_rank(&self) -> bool {
        self.0.len() == 1 && self.0[0].lbound.is_assumed()
    }

    /// Every written bound folded to a constant.
    pub fn is_constant(&self) -> bool {
        self.0.iter().all(|dim| {
            [&dim.lbound, &dim.ubound]
                .into_iter()
                .all(|bound| bound.explicit().is_none_or(Expr::is_constant))
        })
    }
}

impl std::ops::Index<usize> for ArraySpec {
    type Output = ShapeSpec;

    fn index(&self, index: usize) -> &ShapeSpec {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a ArraySpec {
    type Item = &'a ShapeSpec;
    type IntoIter = std::slice::Iter<'a, ShapeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
