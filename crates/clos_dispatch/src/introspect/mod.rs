//! Type introspection for nominal values.
//!
//! The dispatcher never inspects an object's class itself. It asks a
//! `TypeIntrospector` for the value's concrete name, its ancestors in
//! linearized order with their inheritance distances, and the interfaces it
//! implements. Primitive values never
//! reach the introspector.
//!
//! Two implementations ship with the crate:
//!
//! - `ShallowIntrospector`: classifies objects by their class tag only
//! - `ClassHierarchy`: a declared class/interface graph with linearization
//!
//! Any `Fn(&Value) -> Option<TypeDescription> + Send + Sync` also works.

use rustc_hash::FxHashMap;

use crate::{TypeTag, Value};

/// Classification of one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescription {
    /// Concrete type name.
    pub name: TypeTag,
    /// Ancestors in linearized order, each with its inheritance distance
    /// (1 for a direct parent).
    pub ancestors: Vec<(TypeTag, u32)>,
    /// Implemented interfaces, directly implemented first.
    pub interfaces: Vec<TypeTag>,
}

impl TypeDescription {
    /// Description with no ancestors and no interfaces.
    pub fn named(name: impl Into<TypeTag>) -> Self {
        TypeDescription {
            name: name.into(),
            ancestors: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    /// Single inheritance line, nearest first.
    #[must_use]
    pub fn with_ancestors<I, T>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).zip(1..).collect();
        self
    }

    /// Append one ancestor at an explicit inheritance distance.
    #[must_use]
    pub fn with_ancestor(mut self, ancestor: impl Into<TypeTag>, distance: u32) -> Self {
        self.ancestors.push((ancestor.into(), distance));
        self
    }

    /// Ancestor names in linearized order.
    pub fn ancestor_tags(&self) -> impl Iterator<Item = &TypeTag> + '_ {
        self.ancestors.iter().map(|(tag, _)| tag)
    }

    #[must_use]
    pub fn with_interfaces<I, T>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
        self
    }
}

/// Host-supplied classification of non-primitive values.
///
/// Returning `None` marks the value as unclassified; it then matches only
/// the wildcard.
pub trait TypeIntrospector: Send + Sync {
    fn describe(&self, value: &Value) -> Option<TypeDescription>;
}

impl<F> TypeIntrospector for F
where
    F: Fn(&Value) -> Option<TypeDescription> + Send + Sync,
{
    fn describe(&self, value: &Value) -> Option<TypeDescription> {
        self(value)
    }
}

/// Classifies objects by class tag alone: `[Class, *]`.
#[derive(Copy, Clone, Default, Debug)]
pub struct ShallowIntrospector;

impl TypeIntrospector for ShallowIntrospector {
    fn describe(&self, value: &Value) -> Option<TypeDescription> {
        value
            .as_instance()
            .map(|instance| TypeDescription::named(instance.class()))
    }
}

/// Whether a declaration is a class or an interface.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClassKind {
    Class,
    Interface,
}

/// Declaration of one class or interface.
///
/// ```text
/// ClassDef::class("Dog").extends("Animal").implements("IPet")
/// ClassDef::interface("IPet").extends("ICompanion")
/// ```
///
/// For interfaces, `extends` names super-interfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    name: TypeTag,
    kind: ClassKind,
    supers: Vec<TypeTag>,
    interfaces: Vec<TypeTag>,
}

impl ClassDef {
    pub fn class(name: impl Into<TypeTag>) -> Self {
        Self::declare(name.into(), ClassKind::Class)
    }

    pub fn interface(name: impl Into<TypeTag>) -> Self {
        Self::declare(name.into(), ClassKind::Interface)
    }

    fn declare(name: TypeTag, kind: ClassKind) -> Self {
        ClassDef {
            name,
            kind,
            supers: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: impl Into<TypeTag>) -> Self {
        self.supers.push(parent.into());
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeTag>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn name(&self) -> &TypeTag {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }
}

/// Declared class graph.
///
/// # Linearization
///
/// - Ancestors: depth-first over `extends`, in declaration order, first
///   occurrence kept. Cycles are cut at the first revisit. Each ancestor's
///   distance is its shortest path over `extends`, so sibling parents tie.
/// - Interfaces: the class's own interfaces (each followed by its
///   super-interfaces), then those of every ancestor in ancestor order.
///
/// Undeclared classes are described by name only.
#[derive(Clone, Default, Debug)]
pub struct ClassHierarchy {
    defs: FxHashMap<TypeTag, ClassDef>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a declaration.
    pub fn declare(&mut self, def: ClassDef) -> &mut Self {
        self.defs.insert(def.name.clone(), def);
        self
    }

    /// Builder-style `declare`.
    #[must_use]
    pub fn with(mut self, def: ClassDef) -> Self {
        self.declare(def);
        self
    }

    pub fn is_declared(&self, name: &TypeTag) -> bool {
        self.defs.contains_key(name)
    }

    pub fn get(&self, name: &TypeTag) -> Option<&ClassDef> {
        self.defs.get(name)
    }

    /// Full linearized description of a class name.
    pub fn lineage(&self, name: &TypeTag) -> TypeDescription {
        let mut description = TypeDescription::named(name);
        let Some(def) = self.defs.get(name) else {
            return description;
        };

        if def.kind == ClassKind::Interface {
            for parent in &def.supers {
                self.push_interface(parent, name, &mut description.interfaces);
            }
            return description;
        }

        let mut order = Vec::new();
        self.collect_ancestors(def, name, &mut order);
        let distances = self.distances(def, name);
        description.ancestors = order
            .into_iter()
            .map(|tag| {
                let distance = distances.get(&tag).copied().unwrap_or(1);
                (tag, distance)
            })
            .collect();

        for interface in &def.interfaces {
            self.push_interface(interface, name, &mut description.interfaces);
        }
        for (ancestor, _) in &description.ancestors {
            if let Some(ancestor_def) = self.defs.get(ancestor) {
                for interface in &ancestor_def.interfaces {
                    self.push_interface(interface, name, &mut description.interfaces);
                }
            }
        }
        description
    }

    fn collect_ancestors(&self, def: &ClassDef, root: &TypeTag, out: &mut Vec<TypeTag>) {
        for parent in &def.supers {
            if parent == root || out.contains(parent) {
                continue;
            }
            out.push(parent.clone());
            if let Some(parent_def) = self.defs.get(parent) {
                self.collect_ancestors(parent_def, root, out);
            }
        }
    }

    /// Breadth-first over `extends`: shortest distance to every ancestor.
    fn distances(&self, def: &ClassDef, root: &TypeTag) -> FxHashMap<TypeTag, u32> {
        let mut distances = FxHashMap::default();
        let mut frontier: Vec<&TypeTag> = def.supers.iter().collect();
        let mut distance: u32 = 1;
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for tag in frontier {
                if tag == root || distances.contains_key(tag) {
                    continue;
                }
                distances.insert(tag.clone(), distance);
                if let Some(parent) = self.defs.get(tag) {
                    next.extend(&parent.supers);
                }
            }
            frontier = next;
            distance = distance.saturating_add(1);
        }
        distances
    }

    fn push_interface(&self, interface: &TypeTag, root: &TypeTag, out: &mut Vec<TypeTag>) {
        if interface == root || out.contains(interface) {
            return;
        }
        out.push(interface.clone());
        if let Some(def) = self.defs.get(interface) {
            for parent in &def.supers {
                self.push_interface(parent, root, out);
            }
        }
    }
}

impl TypeIntrospector for ClassHierarchy {
    fn describe(&self, value: &Value) -> Option<TypeDescription> {
        value
            .as_instance()
            .map(|instance| self.lineage(instance.class()))
    }
}
