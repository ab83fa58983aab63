//! The classification engine.
//!
//! Classification runs on an explicit stack of [`Frame`]s instead of native
//! recursion, so arbitrarily deep or cyclic type graphs cost heap, not call
//! stack. Each frame owns a [`Task`]: a small state machine that is resumed
//! with the value of the child it last asked for and answers with either the
//! next child it needs ([`Step::Await`]) or its own result ([`Step::Done`]).
//!
//! Entering a type goes through the cache first, then the override matcher,
//! then marks the type `Calculating` before descending. A child that is
//! already `Calculating` is on the stack below us: it resolves immediately to
//! `Unknown`, which every reduction ignores. That is what makes cycles
//! terminate.
//!
//! Dispatch order, first match wins:
//!
//! | shape | rule |
//! |-------|------|
//! | union | `min` over members, stops at `Mutable` |
//! | intersection | object walk over merged properties, index signatures of every member |
//! | conditional | `min` over both branches |
//! | callable without properties | `Immutable` |
//! | tuple | `Mutable` unless readonly, else array walk |
//! | array | object walk, then element types clamped to `ReadonlyShallow` |
//! | object | object walk |
//! | anything else | `Immutable` |

use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use immutype_common::limits::WORKLIST_INITIAL_CAPACITY;

use crate::adapter::StructuralAdapter;
use crate::cache::{CachedImmutability, ImmutabilityCache};
use crate::immutability::Immutability;
use crate::overrides::{ImmutabilityOverride, find_override};
use crate::types::{IndexKind, ObjectKind, PropertyInfo, TypeId, TypeList, TypeRef, TypeShape};

// =============================================================================
// Frames
// =============================================================================

/// A conditional override waiting for the structural result.
#[derive(Debug, Clone, Copy)]
struct PendingOverride {
    from: Immutability,
    to: Immutability,
}

/// What a task wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Classify this child and resume me with its value.
    Await(TypeRef),
    Done(Immutability),
}

/// Outcome of entering a type.
enum Entered {
    /// Resolved without a frame (cache, override, error or leaf type).
    Ready(Immutability),
    /// A frame was pushed; its value arrives once it is popped.
    Pushed,
}

struct Frame {
    ty: TypeRef,
    /// Threshold this frame and its children are classified under.
    threshold: Immutability,
    pending_override: Option<PendingOverride>,
    task: Task,
}

enum Task {
    Reduce(ReduceMin),
    Object(ObjectWalk),
    Array(ArrayWalk),
}

impl Task {
    fn resume<A: StructuralAdapter + ?Sized>(
        &mut self,
        db: &A,
        incoming: Option<Immutability>,
    ) -> Step {
        match self {
            Self::Reduce(reduce) => reduce.resume(incoming),
            Self::Object(walk) => walk.resume(db, incoming),
            Self::Array(walk) => walk.resume(db, incoming),
        }
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// `min` over a list of children, stopping early at `Mutable`.
struct ReduceMin {
    children: SmallVec<[TypeRef; 4]>,
    next: usize,
    acc: Immutability,
}

impl ReduceMin {
    fn new(children: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            children: children.into_iter().collect(),
            next: 0,
            acc: Immutability::Unknown,
        }
    }

    fn resume(&mut self, incoming: Option<Immutability>) -> Step {
        if let Some(value) = incoming {
            self.acc = self.acc.min(value);
            if self.acc == Immutability::Mutable {
                return Step::Done(self.acc);
            }
        }
        match self.children.get(self.next) {
            Some(child) => {
                self.next += 1;
                Step::Await(*child)
            }
            None => Step::Done(self.acc),
        }
    }
}

enum ObjectStage {
    Scan(Vec<PropertyInfo>),
    Properties { types: Vec<TypeId>, next: usize },
    TypeArguments { args: TypeList, next: usize, acc: Immutability },
    IndexSignatures { kind: usize, next: usize, acc: Immutability },
}

/// Walk over an object's own surface: writable-field scan, property types,
/// type arguments, then string and number index signatures.
///
/// `upper` starts at the threshold and only moves down; `lower` becomes
/// `ReadonlyShallow` once the scan finds no writable field. The walk stops as
/// soon as the bounds meet.
struct ObjectWalk {
    ty: TypeId,
    is_tuple: bool,
    /// Types whose index signatures are consulted: the type itself, or every
    /// member of an intersection.
    index_sources: TypeList,
    lower: Immutability,
    upper: Immutability,
    stage: ObjectStage,
}

impl ObjectWalk {
    fn new(
        ty: TypeId,
        properties: Vec<PropertyInfo>,
        index_sources: TypeList,
        is_tuple: bool,
        threshold: Immutability,
    ) -> Self {
        Self {
            ty,
            is_tuple,
            index_sources,
            lower: Immutability::Mutable,
            upper: threshold,
            stage: ObjectStage::Scan(properties),
        }
    }

    fn after_properties<A: StructuralAdapter + ?Sized>(db: &A, ty: TypeId) -> ObjectStage {
        if db.is_type_reference(ty) {
            ObjectStage::TypeArguments {
                args: db.type_arguments(ty),
                next: 0,
                acc: Immutability::Unknown,
            }
        } else {
            ObjectStage::IndexSignatures {
                kind: 0,
                next: 0,
                acc: Immutability::Unknown,
            }
        }
    }

    fn resume<A: StructuralAdapter + ?Sized>(
        &mut self,
        db: &A,
        mut incoming: Option<Immutability>,
    ) -> Step {
        loop {
            match &mut self.stage {
                ObjectStage::Scan(properties) => {
                    if properties.is_empty() {
                        self.stage = Self::after_properties(db, self.ty);
                        continue;
                    }
                    for property in properties.iter() {
                        if property.is_readonly()
                            || property.is_private_name()
                            || (self.is_tuple && property.name == "length")
                        {
                            continue;
                        }
                        if property.is_method() {
                            self.upper = self.upper.min(Immutability::ReadonlyDeep);
                            continue;
                        }
                        return Step::Done(Immutability::Mutable);
                    }
                    self.lower = Immutability::ReadonlyShallow;
                    let types = properties.iter().map(|property| property.type_id).collect();
                    self.stage = ObjectStage::Properties { types, next: 0 };
                }
                ObjectStage::Properties { types, next } => {
                    if let Some(value) = incoming.take() {
                        self.upper = self.upper.min(value);
                        if self.lower.is_at_least(self.upper) {
                            return Step::Done(self.lower);
                        }
                    }
                    if let Some(ty) = types.get(*next) {
                        *next += 1;
                        return Step::Await(TypeRef::new(*ty));
                    }
                    self.stage = Self::after_properties(db, self.ty);
                }
                ObjectStage::TypeArguments { args, next, acc } => {
                    if let Some(value) = incoming.take() {
                        *acc = acc.min(value);
                    }
                    if let Some(ty) = args.get(*next) {
                        *next += 1;
                        return Step::Await(TypeRef::new(*ty));
                    }
                    self.upper = self.upper.min(*acc);
                    if self.lower.is_at_least(self.upper) {
                        return Step::Done(self.lower);
                    }
                    self.stage = ObjectStage::IndexSignatures {
                        kind: 0,
                        next: 0,
                        acc: Immutability::Unknown,
                    };
                }
                ObjectStage::IndexSignatures { kind, next, acc } => {
                    // A value type still being calculated contributes nothing.
                    if let Some(value) = incoming.take().filter(|value| value.is_known()) {
                        *acc = acc.max(Immutability::ReadonlyShallow.max(value));
                    }
                    let index_kind = IndexKind::ORDER[*kind];
                    while let Some(source) = self.index_sources.get(*next).copied() {
                        *next += 1;
                        let Some(signature) = db.index_signature(source, index_kind) else {
                            continue;
                        };
                        if !signature.readonly {
                            *acc = acc.max(Immutability::Mutable);
                        } else if signature.value_type == source {
                            *acc = acc.max(self.upper);
                        } else {
                            return Step::Await(TypeRef::new(signature.value_type));
                        }
                    }
                    self.upper = self.upper.min(*acc);
                    if self.lower.is_at_least(self.upper) {
                        return Step::Done(self.lower);
                    }
                    if *kind + 1 < IndexKind::ORDER.len() {
                        *kind += 1;
                        *next = 0;
                        *acc = Immutability::Unknown;
                    } else {
                        return Step::Done(self.lower.max(self.upper));
                    }
                }
            }
        }
    }
}

enum ArrayStage {
    Shallow,
    Elements {
        shallow: Immutability,
        args: TypeList,
        next: usize,
        acc: Immutability,
    },
}

/// Arrays and readonly tuples: the container's own object walk first, then
/// the element types, which can lift the result no higher than
/// `ReadonlyShallow` on their own.
struct ArrayWalk {
    container: ObjectWalk,
    threshold: Immutability,
    stage: ArrayStage,
}

impl ArrayWalk {
    fn resume<A: StructuralAdapter + ?Sized>(
        &mut self,
        db: &A,
        mut incoming: Option<Immutability>,
    ) -> Step {
        loop {
            match &mut self.stage {
                ArrayStage::Shallow => {
                    let shallow = match self.container.resume(db, incoming.take()) {
                        Step::Await(child) => return Step::Await(child),
                        Step::Done(shallow) => shallow,
                    };
                    if shallow == Immutability::Mutable || shallow.is_at_least(self.threshold) {
                        return Step::Done(shallow);
                    }
                    self.stage = ArrayStage::Elements {
                        shallow,
                        args: db.type_arguments(self.container.ty),
                        next: 0,
                        acc: Immutability::Unknown,
                    };
                }
                ArrayStage::Elements {
                    shallow,
                    args,
                    next,
                    acc,
                } => {
                    if let Some(value) = incoming.take() {
                        *acc = acc.min(value);
                    }
                    if let Some(ty) = args.get(*next) {
                        *next += 1;
                        return Step::Await(TypeRef::new(*ty));
                    }
                    return Step::Done(Immutability::clamp(
                        *shallow,
                        *acc,
                        Immutability::ReadonlyShallow,
                    ));
                }
            }
        }
    }
}

// =============================================================================
// Classifier
// =============================================================================

enum Dispatch {
    Leaf(Immutability),
    Task(Task),
}

/// One top-level classification: borrows the host, overrides and cache for
/// the duration of the run.
pub(crate) struct Classifier<'a, A: StructuralAdapter + ?Sized> {
    db: &'a A,
    overrides: &'a [ImmutabilityOverride],
    cache: &'a mut ImmutabilityCache,
    stack: Vec<Frame>,
}

impl<'a, A: StructuralAdapter + ?Sized> Classifier<'a, A> {
    pub(crate) fn new(
        db: &'a A,
        overrides: &'a [ImmutabilityOverride],
        cache: &'a mut ImmutabilityCache,
    ) -> Self {
        Self {
            db,
            overrides,
            cache,
            stack: Vec::with_capacity(WORKLIST_INITIAL_CAPACITY),
        }
    }

    /// Classifies `root`. Also reports whether the answer came straight
    /// from the cache.
    pub(crate) fn run(&mut self, root: TypeRef, threshold: Immutability) -> (Immutability, bool) {
        if let Some(cached) = self.cache.get(self.db, root, threshold) {
            assert!(
                !cached.is_calculating(),
                "type {:?} is still being calculated outside of any classification",
                root.id
            );
            return (cached, true);
        }

        let mut result = match self.enter(root, threshold) {
            Entered::Ready(value) => return (value, false),
            Entered::Pushed => Immutability::Unknown,
        };

        let mut incoming = None;
        while let Some(frame) = self.stack.last_mut() {
            let threshold = frame.threshold;
            match frame.task.resume(self.db, incoming.take()) {
                Step::Await(child) => {
                    incoming = match self.enter(child, threshold) {
                        Entered::Ready(value) => Some(value.settled()),
                        Entered::Pushed => None,
                    };
                }
                Step::Done(value) => {
                    if let Some(frame) = self.stack.pop() {
                        trace!(
                            type_id = frame.ty.id.0,
                            depth = self.stack.len(),
                            value = value.as_str(),
                            "frame resolved"
                        );
                        let value = self.finish(
                            frame.ty,
                            frame.threshold,
                            frame.pending_override,
                            value,
                        );
                        incoming = Some(value);
                        result = value;
                    }
                }
            }
        }

        assert!(
            !result.is_calculating(),
            "classification of type {:?} ended while still calculating",
            root.id
        );
        (result, false)
    }

    fn enter(&mut self, ty: TypeRef, threshold: Immutability) -> Entered {
        if let Some(cached) = self.cache.get(self.db, ty, threshold) {
            return Entered::Ready(cached);
        }

        let shape = self.db.shape(ty.id);
        if shape == TypeShape::Error {
            trace!(type_id = ty.id.0, "error type contributes nothing");
            return Entered::Ready(Immutability::Unknown);
        }

        let mut pending_override = None;
        if !self.overrides.is_empty()
            && let Some(rule) = find_override(self.db, ty, self.overrides)
        {
            match rule.from {
                None => {
                    self.cache.set(
                        self.db,
                        ty,
                        CachedImmutability {
                            value: rule.to,
                            ceiling: Immutability::Immutable,
                        },
                    );
                    return Entered::Ready(rule.to);
                }
                Some(from) => {
                    pending_override = Some(PendingOverride { from, to: rule.to });
                }
            }
        }

        // A conditional override needs the untruncated value to test its
        // interval.
        let threshold = if pending_override.is_some() {
            Immutability::Immutable
        } else {
            threshold
        };

        self.cache.set(self.db, ty, CachedImmutability::CALCULATING);
        trace!(type_id = ty.id.0, "marked calculating");

        match self.dispatch(ty.id, shape, threshold) {
            Dispatch::Leaf(value) => {
                Entered::Ready(self.finish(ty, threshold, pending_override, value))
            }
            Dispatch::Task(task) => {
                trace!(type_id = ty.id.0, depth = self.stack.len(), "push frame");
                self.stack.push(Frame {
                    ty,
                    threshold,
                    pending_override,
                    task,
                });
                Entered::Pushed
            }
        }
    }

    fn dispatch(&self, ty: TypeId, shape: TypeShape, threshold: Immutability) -> Dispatch {
        match shape {
            TypeShape::Error => Dispatch::Leaf(Immutability::Unknown),
            TypeShape::Union(members) => Dispatch::Task(Task::Reduce(ReduceMin::new(
                members.into_iter().map(TypeRef::new),
            ))),
            TypeShape::Intersection(members) => Dispatch::Task(Task::Object(ObjectWalk::new(
                ty,
                self.db.properties(ty),
                members,
                false,
                threshold,
            ))),
            TypeShape::Conditional {
                true_type,
                false_type,
            } => Dispatch::Task(Task::Reduce(ReduceMin::new([true_type, false_type]))),
            TypeShape::Object(kind) => {
                let properties = self.db.properties(ty);
                if properties.is_empty() && self.db.has_call_signatures(ty) {
                    return Dispatch::Leaf(Immutability::Immutable);
                }
                let sources: TypeList = smallvec![ty];
                match kind {
                    ObjectKind::Tuple { readonly: false } => Dispatch::Leaf(Immutability::Mutable),
                    ObjectKind::Tuple { readonly: true } | ObjectKind::Array => {
                        let is_tuple = matches!(kind, ObjectKind::Tuple { .. });
                        Dispatch::Task(Task::Array(ArrayWalk {
                            container: ObjectWalk::new(ty, properties, sources, is_tuple, threshold),
                            threshold,
                            stage: ArrayStage::Shallow,
                        }))
                    }
                    ObjectKind::Plain => Dispatch::Task(Task::Object(ObjectWalk::new(
                        ty, properties, sources, false, threshold,
                    ))),
                }
            }
            TypeShape::Primitive => Dispatch::Leaf(Immutability::Immutable),
        }
    }

    /// Applies a pending override and records the final value.
    fn finish(
        &mut self,
        ty: TypeRef,
        threshold: Immutability,
        pending_override: Option<PendingOverride>,
        value: Immutability,
    ) -> Immutability {
        debug_assert!(!value.is_calculating());
        let entry = match pending_override {
            Some(rule) if value.is_between(rule.from, rule.to) => {
                debug!(
                    type_id = ty.id.0,
                    computed = value.as_str(),
                    to = rule.to.as_str(),
                    "conditional override applied"
                );
                CachedImmutability {
                    value: rule.to,
                    ceiling: Immutability::Immutable,
                }
            }
            _ => CachedImmutability {
                value,
                ceiling: threshold,
            },
        };
        self.cache.set(self.db, ty, entry);
        entry.value
    }
}

#[cfg(test)]
#[path = "../tests/classify_tests.rs"]
mod tests;
