//! Symbols: attributes, flags, and the per-kind details payload.

use ftn_identity::{Name, ScopeId, Span, SymbolId};

use crate::array_spec::ArraySpec;
use crate::evaluate::Expr;
use crate::types::{DeclTypeSpec, TypeParamAttr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Abstract,
    Allocatable,
    Asynchronous,
    BindC,
    Contiguous,
    Deferred,
    External,
    Intrinsic,
    Optional,
    Parameter,
    Pointer,
    Private,
    Protected,
    Public,
    Save,
    Target,
    Value,
    Volatile,
}

impl Attr {
    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of `Attr`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attrs(u32);

impl Attrs {
    pub const fn empty() -> Self {
        Attrs(0)
    }

    pub fn with(mut self, attr: Attr) -> Self {
        self.insert(attr);
        self
    }

    pub fn contains(self, attr: Attr) -> bool {
        self.0 & attr.bit() != 0
    }

    pub fn insert(&mut self, attr: Attr) {
        self.0 |= attr.bit();
    }

    pub fn remove(&mut self, attr: Attr) {
        self.0 &= !attr.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Attr> for Attrs {
    fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> Self {
        iter.into_iter().fold(Attrs::empty(), Attrs::with)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolFlag {
    /// An error was already reported against this symbol
    Error,
    Function,
    Subroutine,
    Implicit,
    /// The component that holds the parent type of an extended type
    ParentComp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u16);

impl Flags {
    fn bit(flag: SymbolFlag) -> u16 {
        1 << (flag as u16)
    }

    pub fn contains(self, flag: SymbolFlag) -> bool {
        self.0 & Self::bit(flag) != 0
    }

    pub fn insert(&mut self, flag: SymbolFlag) {
        self.0 |= Self::bit(flag);
    }

    pub fn remove(&mut self, flag: SymbolFlag) {
        self.0 &= !Self::bit(flag);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleDetails {
    pub is_submodule: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubprogramDetails {
    pub dummy_args: Vec<SymbolId>,
    pub result: Option<SymbolId>,
    pub is_interface: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectEntityDetails {
    pub ty: Option<DeclTypeSpec>,
    pub init: Option<Expr>,
    pub shape: ArraySpec,
    pub coshape: ArraySpec,
    pub is_dummy: bool,
    pub is_func_result: bool,
    pub common_block: Option<SymbolId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcEntityDetails {
    pub interface: Option<SymbolId>,
    pub ty: Option<DeclTypeSpec>,
    pub is_dummy: bool,
    pub is_func_result: bool,
}

#[derive(Debug, Clone)]
pub struct TypeParamDetails {
    pub attr: TypeParamAttr,
    pub ty: Option<DeclTypeSpec>,
    /// Default value in a definition; the actual value in an instance
    pub init: Option<Expr>,
}

impl TypeParamDetails {
    pub fn new(attr: TypeParamAttr) -> Self {
        Self {
            attr,
            ty: None,
            init: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DerivedTypeDetails {
    /// Own type parameters in declaration order
    pub param_names: Vec<Name>,
    pub param_decls: Vec<SymbolId>,
    /// Components in declaration order, parent component first
    pub component_names: Vec<Name>,
    pub sequence: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GenericDetails {
    pub specifics: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct UseDetails {
    pub symbol: SymbolId,
    pub module: SymbolId,
}

#[derive(Debug, Clone)]
pub struct HostAssocDetails {
    pub symbol: SymbolId,
}

#[derive(Debug, Clone, Default)]
pub struct CommonBlockDetails {
    pub objects: Vec<SymbolId>,
}

/// What kind of entity a symbol is, with the data for that kind.
#[derive(Debug, Clone, Default)]
pub enum Details {
    #[default]
    Unknown,
    MainProgram,
    Module(ModuleDetails),
    Subprogram(SubprogramDetails),
    ObjectEntity(ObjectEntityDetails),
    ProcEntity(ProcEntityDetails),
    TypeParam(TypeParamDetails),
    DerivedType(DerivedTypeDetails),
    Generic(GenericDetails),
    Use(UseDetails),
    HostAssoc(HostAssocDetails),
    CommonBlock(CommonBlockDetails),
    FinalProc,
}

impl Details {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Details::Unknown => "unknown",
            Details::MainProgram => "main program",
            Details::Module(_) => "module",
            Details::Subprogram(_) => "subprogram",
            Details::ObjectEntity(_) => "object",
            Details::ProcEntity(_) => "procedure",
            Details::TypeParam(_) => "type parameter",
            Details::DerivedType(_) => "derived type",
            Details::Generic(_) => "generic",
            Details::Use(_) => "use association",
            Details::HostAssoc(_) => "host association",
            Details::CommonBlock(_) => "common block",
            Details::FinalProc => "final procedure",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    name: Name,
    owner: ScopeId,
    attrs: Attrs,
    flags: Flags,
    details: Details,
    /// The scope this symbol defines (modules, subprograms, derived types)
    scope: Option<ScopeId>,
    span: Span,
}

impl Symbol {
    pub(crate) fn new(name: Name, owner: ScopeId, attrs: Attrs, details: Details, span: Span) -> Self {
        Self {
            name,
            owner,
            attrs,
            flags: Flags::default(),
            details,
            scope: None,
            span,
        }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn owner(&self) -> ScopeId {
        self.owner
    }

    pub fn attrs(&self) -> Attrs {
        self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    pub fn test(&self, flag: SymbolFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut Details {
        &mut self.details
    }

    pub fn set_details(&mut self, details: Details) {
        self.details = details;
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn set_scope(&mut self, scope: ScopeId) {
        self.scope = Some(scope);
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn as_object(&self) -> Option<&ObjectEntityDetails> {
        match &self.details {
            Details::ObjectEntity(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectEntityDetails> {
        match &mut self.details {
            Details::ObjectEntity(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_type_param(&self) -> Option<&TypeParamDetails> {
        match &self.details {
            Details::TypeParam(param) => Some(param),
            _ => None,
        }
    }

    /// Derived-type details; a type symbol without them is a broken invariant.
    pub fn derived_type_details(&self) -> &DerivedTypeDetails {
        match &self.details {
            Details::DerivedType(details) => details,
            other => panic!("expected derived type details, found {}", other.kind_name()),
        }
    }

    /// The declared type of an object, procedure or type parameter.
    pub fn decl_type(&self) -> Option<&DeclTypeSpec> {
        match &self.details {
            Details::ObjectEntity(object) => object.ty.as_ref(),
            Details::ProcEntity(proc) => proc.ty.as_ref(),
            Details::TypeParam(param) => param.ty.as_ref(),
            _ => None,
        }
    }

    pub fn is_dummy(&self) -> bool {
        match &self.details {
            Details::ObjectEntity(object) => object.is_dummy,
            Details::ProcEntity(proc) => proc.is_dummy,
            _ => false,
        }
    }

    pub fn is_func_result(&self) -> bool {
        match &self.details {
            Details::ObjectEntity(object) => object.is_func_result,
            Details::ProcEntity(proc) => proc.is_func_result,
            _ => false,
        }
    }

    pub fn is_object_array(&self) -> bool {
        self.as_object().is_some_and(|object| !object.shape.is_empty())
    }

    pub fn is_pointer(&self) -> bool {
        self.attrs.contains(Attr::Pointer)
    }

    pub fn is_allocatable(&self) -> bool {
        self.attrs.contains(Attr::Allocatable)
    }

    pub fn is_allocatable_or_pointer(&self) -> bool {
        self.is_pointer() || self.is_allocatable()
    }

    pub fn rank(&self) -> usize {
        self.as_object().map_or(0, |object| object.shape.rank())
    }

    pub fn corank(&self) -> usize {
        self.as_object().map_or(0, |object| object.coshape.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_set_operations() {
        let mut attrs: Attrs = [Attr::Save, Attr::Target].into_iter().collect();
        assert!(attrs.contains(Attr::Save));
        assert!(!attrs.contains(Attr::Pointer));
        attrs.remove(Attr::Save);
        assert!(!attrs.contains(Attr::Save));
        attrs.remove(Attr::Target);
        assert!(attrs.is_empty());
    }

    #[test]
    fn flags_are_independent() {
        let mut flags = Flags::default();
        flags.insert(SymbolFlag::ParentComp);
        assert!(flags.contains(SymbolFlag::ParentComp));
        assert!(!flags.contains(SymbolFlag::Error));
    }
}
