use std::{
    any::{type_name, Any},
    borrow::Cow,
    fmt::{Debug, Display},
    sync::Arc,
};

/// Boxed error used for foreign failures (constructor bodies, context lookups)
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Construction functions may be shared between threads,
/// so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Name of a generic type family, e.g. `Repository` for `Repository<_>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(pub Cow<'static, str>);
impl FamilyId {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        FamilyId(name.into())
    }
}
impl Display for FamilyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host independent description of a type
///
/// Rust has no runtime reflection, so types taking part in constructor selection
/// are described by value. [TypeKey::of] covers plain Rust types, generic families
/// are spelled out with [TypeKey::definition] and [TypeKey::generic].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A plain, non generic type
    Named(Cow<'static, str>),
    /// Array of the given element type
    Array(Box<TypeKey>),
    /// Open generic type definition, e.g. `Repository<_>`
    Definition { family: FamilyId, arity: usize },
    /// Generic type with its arguments supplied
    Generic { family: FamilyId, args: Vec<TypeKey> },
    /// Positional generic parameter of the enclosing definition
    Parameter(usize),
}

impl TypeKey {
    pub const TYPE: &'static str = "Type";
    pub const ARRAY: &'static str = "Array";
    pub const OBJECT: &'static str = "Object";

    pub fn of<T: 'static + ?Sized>() -> TypeKey {
        TypeKey::Named(Cow::Borrowed(type_name::<T>()))
    }

    pub fn named(name: impl Into<Cow<'static, str>>) -> TypeKey {
        TypeKey::Named(name.into())
    }

    pub fn array_of(element: TypeKey) -> TypeKey {
        TypeKey::Array(Box::new(element))
    }

    pub fn definition(family: impl Into<Cow<'static, str>>, arity: usize) -> TypeKey {
        TypeKey::Definition {
            family: FamilyId::new(family),
            arity,
        }
    }

    pub fn generic(family: impl Into<Cow<'static, str>>, args: Vec<TypeKey>) -> TypeKey {
        TypeKey::Generic {
            family: FamilyId::new(family),
            args,
        }
    }

    pub fn parameter(position: usize) -> TypeKey {
        TypeKey::Parameter(position)
    }

    /// The type of values which denote a type
    pub fn type_marker() -> TypeKey {
        TypeKey::Named(Cow::Borrowed(Self::TYPE))
    }

    /// The base of all array types
    pub fn array_marker() -> TypeKey {
        TypeKey::Named(Cow::Borrowed(Self::ARRAY))
    }

    /// Root type everything is assignable to
    pub fn object() -> TypeKey {
        TypeKey::Named(Cow::Borrowed(Self::OBJECT))
    }

    pub fn is_type_marker(&self) -> bool {
        matches!(self, TypeKey::Named(name) if name == Self::TYPE)
    }

    pub fn is_array_marker(&self) -> bool {
        matches!(self, TypeKey::Named(name) if name == Self::ARRAY)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeKey::Named(name) if name == Self::OBJECT)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeKey::Array(_))
    }

    /// True for open definitions and for closed generic types
    pub fn is_generic(&self) -> bool {
        matches!(self, TypeKey::Definition { .. } | TypeKey::Generic { .. })
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, TypeKey::Definition { .. })
    }

    /// The open definition a closed generic type was built from
    pub fn definition_of(&self) -> Option<TypeKey> {
        match self {
            TypeKey::Generic { family, args } => Some(TypeKey::Definition {
                family: family.clone(),
                arity: args.len(),
            }),
            TypeKey::Definition { .. } => Some(self.clone()),
            _ => None,
        }
    }

    /// True if the type still needs generic arguments before it can be built
    pub fn is_open(&self) -> bool {
        match self {
            TypeKey::Named(_) => false,
            TypeKey::Definition { .. } | TypeKey::Parameter(_) => true,
            TypeKey::Array(element) => element.is_open(),
            TypeKey::Generic { args, .. } => args.iter().any(TypeKey::is_open),
        }
    }

    /// Replaces generic parameters with the given arguments
    ///
    /// Parameters without a matching argument are kept as they are.
    pub fn substitute(&self, args: &[TypeKey]) -> TypeKey {
        match self {
            TypeKey::Parameter(position) => args
                .get(*position)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeKey::Array(element) => TypeKey::Array(Box::new(element.substitute(args))),
            TypeKey::Generic { family, args: inner } => TypeKey::Generic {
                family: family.clone(),
                args: inner.iter().map(|arg| arg.substitute(args)).collect(),
            },
            TypeKey::Named(_) | TypeKey::Definition { .. } => self.clone(),
        }
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKey::Named(name) => f.write_str(name),
            TypeKey::Array(element) => write!(f, "{element}[]"),
            TypeKey::Definition { family, arity } => {
                let holes = vec!["_"; *arity].join(", ");
                write!(f, "{family}<{holes}>")
            }
            TypeKey::Generic { family, args } => {
                let args = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{family}<{args}>")
            }
            TypeKey::Parameter(position) => write!(f, "T{position}"),
        }
    }
}

/// A constructed or literal value together with the type it presents itself as
#[derive(Clone)]
pub struct Instance {
    pub type_key: TypeKey,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self::with_type(TypeKey::of::<T>(), instance)
    }

    /// Instance presenting itself as `type_key`, used for generic instantiations
    /// which [TypeKey::of] cannot describe
    pub fn with_type<T: Injectable>(type_key: TypeKey, instance: T) -> Self {
        Instance {
            type_key,
            instance: Arc::new(instance),
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &TypeKey> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(&self.type_key),
        }
    }

    pub fn downcast_ref<T: Injectable>(&self) -> Option<&T> {
        self.instance.downcast_ref()
    }

    /// True if both handles point at the same value
    pub fn same_instance(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}
