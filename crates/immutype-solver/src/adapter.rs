//! The boundary between the engine and the host type system.
//!
//! Everything the engine learns about a type comes through
//! [`StructuralAdapter`]. Implementations are expected to be cheap to query
//! repeatedly; the engine does not memoize adapter answers beyond the final
//! immutability result.

use crate::type_name::TypeName;
use crate::types::{
    IndexKind, IndexSignature, PropertyInfo, RecursionIdentity, SourceFileInfo, TypeId, TypeList,
    TypeRef, TypeShape,
};

/// Structural queries over a host type system.
pub trait StructuralAdapter {
    /// Structural category of `ty`.
    fn shape(&self, ty: TypeId) -> TypeShape;

    /// Own properties of an object-category type. For intersections, the
    /// merged properties of all constituents (a property is read-only when
    /// any constituent declares it read-only).
    fn properties(&self, ty: TypeId) -> Vec<PropertyInfo>;

    /// Whether `ty` has at least one call signature.
    fn has_call_signatures(&self, ty: TypeId) -> bool;

    /// Whether `ty` is a reference to a generic declaration (`Foo<A, B>`).
    fn is_type_reference(&self, ty: TypeId) -> bool;

    /// Type arguments of a type reference; empty for everything else.
    fn type_arguments(&self, ty: TypeId) -> TypeList;

    /// The index signature of `ty` for `kind`, if declared.
    fn index_signature(&self, ty: TypeId, kind: IndexKind) -> Option<IndexSignature>;

    /// The host's recursion identity for `ty`.
    fn recursion_identity(&self, ty: TypeId) -> RecursionIdentity;

    /// Textual forms of `ty` used for override matching.
    fn type_name(&self, ty: TypeRef) -> TypeName;

    /// Source files declaring the symbol behind `ty`. Empty for intrinsics.
    fn declaration_files(&self, ty: TypeId) -> Vec<SourceFileInfo>;

    /// Root directory of the user's project.
    fn current_directory(&self) -> String;

    /// Directories holding ambient type packages (`node_modules/@types`).
    fn type_roots(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<A: StructuralAdapter + ?Sized> StructuralAdapter for &A {
    fn shape(&self, ty: TypeId) -> TypeShape {
        (**self).shape(ty)
    }

    fn properties(&self, ty: TypeId) -> Vec<PropertyInfo> {
        (**self).properties(ty)
    }

    fn has_call_signatures(&self, ty: TypeId) -> bool {
        (**self).has_call_signatures(ty)
    }

    fn is_type_reference(&self, ty: TypeId) -> bool {
        (**self).is_type_reference(ty)
    }

    fn type_arguments(&self, ty: TypeId) -> TypeList {
        (**self).type_arguments(ty)
    }

    fn index_signature(&self, ty: TypeId, kind: IndexKind) -> Option<IndexSignature> {
        (**self).index_signature(ty, kind)
    }

    fn recursion_identity(&self, ty: TypeId) -> RecursionIdentity {
        (**self).recursion_identity(ty)
    }

    fn type_name(&self, ty: TypeRef) -> TypeName {
        (**self).type_name(ty)
    }

    fn declaration_files(&self, ty: TypeId) -> Vec<SourceFileInfo> {
        (**self).declaration_files(ty)
    }

    fn current_directory(&self) -> String {
        (**self).current_directory()
    }

    fn type_roots(&self) -> Vec<String> {
        (**self).type_roots()
    }
}
