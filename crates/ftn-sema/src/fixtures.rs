// fixtures.rs
//
// Builders for scope trees, symbols and derived types, used by tests in place
// of a parser.

use ftn_frontend::{self as syntax, DataRef, Designator, DesignatorKind, Ident, Subscript};
use ftn_identity::{DerivedTypeSpecId, Name, ScopeId, Span, SymbolId};

use crate::array_spec::{ArraySpec, Bound, ShapeSpec};
use crate::context::SemanticsContext;
use crate::evaluate::Expr;
use crate::options::SemanticsOptions;
use crate::scope::ScopeKind;
use crate::symbol::{
    Attr, Attrs, DerivedTypeDetails, Details, ModuleDetails, ObjectEntityDetails,
    ProcEntityDetails, SubprogramDetails, SymbolFlag, TypeParamDetails,
};
use crate::types::{DeclTypeSpec, DerivedTypeSpec, IntrinsicTypeSpec, TypeCategory, TypeParamAttr};

pub struct Fixture {
    pub ctx: SemanticsContext,
    next_line: u32,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_options(SemanticsOptions::default())
    }

    pub fn with_options(options: SemanticsOptions) -> Self {
        Self {
            ctx: SemanticsContext::new(options),
            next_line: 1,
        }
    }

    /// A fresh span on its own line, so notes and labels can be told apart.
    pub fn span(&mut self) -> Span {
        let line = self.next_line;
        self.next_line += 1;
        Span::new(line as usize * 100, line as usize * 100 + 10, line, 1)
    }

    pub fn name(&mut self, s: &str) -> Name {
        self.ctx.intern(s)
    }

    pub fn ident(&mut self, s: &str) -> Ident {
        let name = self.name(s);
        Ident::new(name, self.span())
    }

    // ------------------------------------------------------------------
    // Program units
    // ------------------------------------------------------------------

    pub fn program(&mut self, name: &str) -> ScopeId {
        let global = self.ctx.global_scope();
        self.unit(global, name, ScopeKind::MainProgram, Details::MainProgram)
    }

    pub fn module(&mut self, name: &str) -> ScopeId {
        let global = self.ctx.global_scope();
        self.unit(global, name, ScopeKind::Module, Details::Module(ModuleDetails::default()))
    }

    pub fn subprogram(&mut self, parent: ScopeId, name: &str) -> ScopeId {
        self.unit(
            parent,
            name,
            ScopeKind::Subprogram,
            Details::Subprogram(SubprogramDetails::default()),
        )
    }

    fn unit(&mut self, parent: ScopeId, name: &str, kind: ScopeKind, details: Details) -> ScopeId {
        let name = self.name(name);
        let span = self.span();
        let (symbol, _) = self.ctx.try_emplace(parent, name, Attrs::empty(), details, span);
        self.ctx.make_scope(parent, kind, Some(symbol))
    }

    // ------------------------------------------------------------------
    // Syntax
    // ------------------------------------------------------------------

    pub fn int_expr(&self, value: i64) -> syntax::Expr {
        syntax::Expr::int(value, Span::default())
    }

    pub fn name_expr(&mut self, s: &str) -> syntax::Expr {
        let ident = self.ident(s);
        syntax::Expr::name(ident.name, ident.span)
    }

    /// `name`
    pub fn whole(&mut self, name: &str) -> Designator {
        let ident = self.ident(name);
        Designator::data_ref(DataRef::Name(ident), ident.span)
    }

    /// `name(s1, s2, ...)` with integer literal subscripts
    pub fn element(&mut self, name: &str, subscripts: &[i64]) -> Designator {
        let subscripts = subscripts
            .iter()
            .map(|s| Subscript::Expr(self.int_expr(*s)))
            .collect();
        self.element_with(name, subscripts)
    }

    pub fn element_with(&mut self, name: &str, subscripts: Vec<Subscript>) -> Designator {
        let ident = self.ident(name);
        Designator::data_ref(
            DataRef::ArrayElement {
                base: Box::new(DataRef::Name(ident)),
                subscripts,
            },
            ident.span,
        )
    }

    /// `base(lower:upper)`
    pub fn substring(&mut self, base: Designator, lower: Option<i64>, upper: Option<i64>) -> Designator {
        let span = base.span;
        let DesignatorKind::DataRef(base) = base.kind else {
            panic!("substring base must be a data reference");
        };
        Designator::new(
            DesignatorKind::Substring {
                base,
                lower: lower.map(|v| self.int_expr(v)),
                upper: upper.map(|v| self.int_expr(v)),
            },
            span,
        )
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn intrinsic(&self, category: TypeCategory, kind: i64) -> DeclTypeSpec {
        DeclTypeSpec::Intrinsic(IntrinsicTypeSpec::new(category, kind))
    }

    pub fn default_type(&self, category: TypeCategory) -> DeclTypeSpec {
        self.intrinsic(category, self.ctx.options().default_kind(category))
    }

    /// An intrinsic type whose kind is a type parameter of the enclosing type.
    pub fn kind_param_type(&self, category: TypeCategory, param: SymbolId) -> DeclTypeSpec {
        DeclTypeSpec::Intrinsic(IntrinsicTypeSpec::with_kind_expr(category, Expr::TypeParam(param)))
    }

    /// A spec with no parameter values.
    pub fn spec_of(&mut self, type_symbol: SymbolId) -> DerivedTypeSpecId {
        self.ctx.add_spec(DerivedTypeSpec::new(type_symbol))
    }

    pub fn type_of(&mut self, type_symbol: SymbolId) -> DeclTypeSpec {
        DeclTypeSpec::TypeDerived(self.spec_of(type_symbol))
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    pub fn object(&mut self, scope: ScopeId, name: &str, ty: Option<DeclTypeSpec>) -> SymbolId {
        let name = self.name(name);
        let span = self.span();
        let details = ObjectEntityDetails {
            ty,
            ..Default::default()
        };
        self.ctx
            .try_emplace(scope, name, Attrs::empty(), Details::ObjectEntity(details), span)
            .0
    }

    pub fn integer_var(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        let ty = self.default_type(TypeCategory::Integer);
        self.object(scope, name, Some(ty))
    }

    pub fn named_constant(&mut self, scope: ScopeId, name: &str, value: Expr) -> SymbolId {
        let symbol = self.integer_var(scope, name);
        self.add_attr(symbol, Attr::Parameter);
        self.object_mut(symbol).init = Some(value);
        symbol
    }

    pub fn add_attr(&mut self, symbol: SymbolId, attr: Attr) {
        self.ctx.symbol_mut(symbol).attrs_mut().insert(attr);
    }

    /// Give an object an explicit shape with constant bounds.
    pub fn set_shape(&mut self, symbol: SymbolId, dims: &[(i64, i64)]) {
        self.object_mut(symbol).shape = ArraySpec::new(
            dims.iter()
                .map(|(lb, ub)| ShapeSpec::explicit(Bound::constant(*lb), Bound::constant(*ub)))
                .collect(),
        );
    }

    pub fn set_shape_spec(&mut self, symbol: SymbolId, shape: ArraySpec) {
        self.object_mut(symbol).shape = shape;
    }

    /// Make an object a coarray with deferred codimensions.
    pub fn set_corank(&mut self, symbol: SymbolId, corank: usize) {
        self.object_mut(symbol).coshape = ArraySpec::new(vec![ShapeSpec::deferred(); corank]);
    }

    pub fn object_mut(&mut self, symbol: SymbolId) -> &mut ObjectEntityDetails {
        self.ctx
            .symbol_mut(symbol)
            .as_object_mut()
            .expect("fixture symbol must be an object")
    }

    // ------------------------------------------------------------------
    // Derived types
    // ------------------------------------------------------------------

    /// Declare a derived type in `scope` and open its definition scope.
    pub fn derived_type(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        let name = self.name(name);
        let span = self.span();
        let (symbol, _) = self.ctx.try_emplace(
            scope,
            name,
            Attrs::empty(),
            Details::DerivedType(DerivedTypeDetails::default()),
            span,
        );
        self.ctx.make_scope(scope, ScopeKind::DerivedType, Some(symbol));
        symbol
    }

    pub fn sequence(&mut self, type_symbol: SymbolId) {
        self.type_details_mut(type_symbol).sequence = true;
    }

    pub fn type_param(
        &mut self,
        type_symbol: SymbolId,
        name: &str,
        attr: TypeParamAttr,
        default: Option<Expr>,
    ) -> SymbolId {
        let scope = self.type_scope(type_symbol);
        let name = self.name(name);
        let span = self.span();
        let mut details = TypeParamDetails::new(attr);
        details.ty = Some(self.default_type(TypeCategory::Integer));
        details.init = default;
        let (symbol, _) =
            self.ctx
                .try_emplace(scope, name, Attrs::empty(), Details::TypeParam(details), span);
        let type_details = self.type_details_mut(type_symbol);
        type_details.param_names.push(name);
        type_details.param_decls.push(symbol);
        symbol
    }

    pub fn component(&mut self, type_symbol: SymbolId, name: &str, ty: DeclTypeSpec) -> SymbolId {
        self.component_with(type_symbol, name, ty, Attrs::empty())
    }

    pub fn component_with(
        &mut self,
        type_symbol: SymbolId,
        name: &str,
        ty: DeclTypeSpec,
        attrs: Attrs,
    ) -> SymbolId {
        let scope = self.type_scope(type_symbol);
        let name = self.name(name);
        let span = self.span();
        let details = ObjectEntityDetails {
            ty: Some(ty),
            ..Default::default()
        };
        let (symbol, _) = self
            .ctx
            .try_emplace(scope, name, attrs, Details::ObjectEntity(details), span);
        self.type_details_mut(type_symbol).component_names.push(name);
        symbol
    }

    pub fn proc_component(&mut self, type_symbol: SymbolId, name: &str) -> SymbolId {
        let scope = self.type_scope(type_symbol);
        let name = self.name(name);
        let span = self.span();
        let (symbol, _) = self.ctx.try_emplace(
            scope,
            name,
            Attrs::empty().with(Attr::Pointer),
            Details::ProcEntity(ProcEntityDetails::default()),
            span,
        );
        self.type_details_mut(type_symbol).component_names.push(name);
        symbol
    }

    pub fn final_proc(&mut self, type_symbol: SymbolId, name: &str) -> SymbolId {
        let scope = self.type_scope(type_symbol);
        let name = self.name(name);
        let span = self.span();
        self.ctx
            .try_emplace(scope, name, Attrs::empty(), Details::FinalProc, span)
            .0
    }

    /// Make `type_symbol` extend `parent`: adds the parent component, named
    /// after the parent type, ahead of every other component.
    pub fn extends(&mut self, type_symbol: SymbolId, parent: SymbolId) -> SymbolId {
        let parent_name = self.ctx.symbol(parent).name();
        let parent_type = self.type_of(parent);
        let scope = self.type_scope(type_symbol);
        let span = self.span();
        let details = ObjectEntityDetails {
            ty: Some(parent_type),
            ..Default::default()
        };
        let (symbol, _) = self.ctx.try_emplace(
            scope,
            parent_name,
            Attrs::empty(),
            Details::ObjectEntity(details),
            span,
        );
        self.ctx
            .symbol_mut(symbol)
            .flags_mut()
            .insert(SymbolFlag::ParentComp);
        self.type_details_mut(type_symbol)
            .component_names
            .insert(0, parent_name);
        symbol
    }

    pub fn type_scope(&self, type_symbol: SymbolId) -> ScopeId {
        self.ctx
            .symbol(type_symbol)
            .scope()
            .expect("fixture derived type must have a scope")
    }

    fn type_details_mut(&mut self, type_symbol: SymbolId) -> &mut DerivedTypeDetails {
        match self.ctx.symbol_mut(type_symbol).details_mut() {
            Details::DerivedType(details) => details,
            other => panic!("expected a derived type, found {}", other.kind_name()),
        }
    }
}
