use std::{
    any::type_name,
    collections::{HashMap, HashSet},
    fmt::{Debug, Display},
    sync::Arc,
};

use crate::{
    errors::InvokeError,
    types::{DynError, Injectable, Instance, TypeKey},
};

/// Calls a constructor
///
/// Receives the type being built (the closed type for generic families)
/// and the arguments in parameter order.
pub type Invoker = Arc<dyn Fn(&TypeKey, Vec<Instance>) -> Result<Instance, DynError> + Send + Sync>;

/// A single constructor of a type, as seen through a [TypeIntrospector]
#[derive(Clone)]
pub struct ConstructorMetadata {
    declaring_type: TypeKey,
    parameters: Vec<TypeKey>,
    is_public: bool,
    is_static: bool,
    invoker: Invoker,
}

impl ConstructorMetadata {
    /// A public instance constructor
    pub fn new<F>(declaring_type: TypeKey, parameters: Vec<TypeKey>, invoker: F) -> Self
    where
        F: Fn(&TypeKey, Vec<Instance>) -> Result<Instance, DynError> + Send + Sync + 'static,
    {
        ConstructorMetadata {
            declaring_type,
            parameters,
            is_public: true,
            is_static: false,
            invoker: Arc::new(invoker),
        }
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn static_ctor(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Same constructor on a closed instantiation of its generic definition
    pub fn close(&self, closed: &TypeKey) -> ConstructorMetadata {
        let args = match closed {
            TypeKey::Generic { args, .. } => args.as_slice(),
            _ => &[],
        };

        ConstructorMetadata {
            declaring_type: closed.clone(),
            parameters: self.parameters.iter().map(|p| p.substitute(args)).collect(),
            is_public: self.is_public,
            is_static: self.is_static,
            invoker: self.invoker.clone(),
        }
    }

    /// Calls the constructor with already produced arguments
    pub fn invoke(&self, args: Vec<Instance>) -> Result<Instance, DynError> {
        if args.len() != self.parameters.len() {
            return Err(Box::new(InvokeError::ArgumentCount {
                constructor: self.to_string(),
                expected: self.parameters.len(),
                actual: args.len(),
            }));
        }

        (self.invoker)(&self.declaring_type, args)
    }
}

impl PartialEq for ConstructorMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.parameters == other.parameters
            && self.is_public == other.is_public
            && self.is_static == other.is_static
            && std::ptr::addr_eq(Arc::as_ptr(&self.invoker), Arc::as_ptr(&other.invoker))
    }
}

impl Display for ConstructorMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.declaring_type, signature(&self.parameters))
    }
}
impl Debug for ConstructorMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorMetadata")
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .field("is_public", &self.is_public)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Comma separated list of types, as used in error messages
pub fn signature<'a>(types: impl IntoIterator<Item = &'a TypeKey>) -> String {
    types
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads the argument at `position` as `T`, for use inside invokers
pub fn argument<T: Injectable>(args: &[Instance], position: usize) -> Result<Arc<T>, InvokeError> {
    let arg = args
        .get(position)
        .ok_or(InvokeError::MissingArgument { position })?;

    arg.downcast::<T>()
        .map_err(|actual_type| InvokeError::DowncastFailed {
            position,
            required_type: type_name::<T>(),
            actual_type: actual_type.clone(),
        })
}

/// Read-only view on type metadata
///
/// Stands in for runtime reflection: it lists constructors and answers
/// assignability questions. Implementations must not change answers after
/// construction functions were built from them.
pub trait TypeIntrospector: Send + Sync {
    /// All declared constructors of the type in a stable order, including private and static ones
    fn list_constructors(&self, type_key: &TypeKey) -> Vec<ConstructorMetadata>;

    /// True if a value of type `source` may be passed where `target` is expected
    fn is_assignable_from(&self, target: &TypeKey, source: &TypeKey) -> bool;

    fn is_generic_definition(&self, type_key: &TypeKey) -> bool {
        type_key.is_definition()
    }

    /// The open definition a generic type was closed from
    fn generic_definition_of(&self, type_key: &TypeKey) -> Option<TypeKey> {
        type_key.definition_of()
    }
}

/// Introspector backed by registration tables
///
/// Constructors are registered per plain type or per generic definition,
/// constructors of closed generic types are derived from their definition.
#[derive(Default, Clone)]
pub struct TypeRegistry {
    constructors: HashMap<TypeKey, Vec<ConstructorMetadata>>,
    supertypes: HashMap<TypeKey, Vec<TypeKey>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constructor to its declaring type, keeping registration order
    pub fn add_constructor(mut self, constructor: ConstructorMetadata) -> Self {
        self.constructors
            .entry(constructor.declaring_type.clone())
            .or_default()
            .push(constructor);
        self
    }

    /// Declares that `type_key` can be used wherever `supertype` is expected
    pub fn add_supertype(mut self, type_key: TypeKey, supertype: TypeKey) -> Self {
        self.supertypes.entry(type_key).or_default().push(supertype);
        self
    }
}

impl TypeIntrospector for TypeRegistry {
    fn list_constructors(&self, type_key: &TypeKey) -> Vec<ConstructorMetadata> {
        if let Some(constructors) = self.constructors.get(type_key) {
            return constructors.clone();
        }

        // Closed generic - derive from the definition
        let Some(definition) = type_key.definition_of() else {
            return Vec::new();
        };

        self.constructors
            .get(&definition)
            .map(|constructors| {
                constructors
                    .iter()
                    .map(|constructor| constructor.close(type_key))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_assignable_from(&self, target: &TypeKey, source: &TypeKey) -> bool {
        if target == source || target.is_object() {
            return true;
        }

        // Walk all supertypes of source
        let mut visited = HashSet::new();
        let mut pending = vec![source];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }

            for supertype in self.supertypes.get(current).into_iter().flatten() {
                if supertype == target {
                    return true;
                }
                pending.push(supertype);
            }
        }

        false
    }
}
