//! Fixture types and introspection tables shared by the unit tests

use std::collections::HashMap;

use crate::{
    introspection::{argument, ConstructorMetadata, TypeRegistry},
    pipeline::ResolutionContext,
    types::{DynError, Instance, TypeKey},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WidgetValue {
    Int(i32),
    Text(String),
}

/// Constructors: `(i32)`, `(String)`, private `()`, static `()`
#[derive(Debug)]
pub(crate) struct Widget {
    pub value: WidgetValue,
}

/// Interface marker, implemented by [ServiceImpl]
pub(crate) struct IService;
pub(crate) struct ServiceImpl;

/// Constructors: `(Object)`, `(IService)`
#[derive(Debug)]
pub(crate) struct Consumer {
    pub via: &'static str,
}

/// Constructors: `()`, `(i32, String)`
#[derive(Debug)]
pub(crate) struct Pair {
    pub arity: usize,
}

/// Constructors: `(String[])`
pub(crate) struct Batch;

/// Generic family `Repository<T>`, constructors `(String)`, `(T)`, `(T, i32)`
#[derive(Debug)]
pub(crate) struct Repository {
    pub closed: TypeKey,
    pub ordinal: usize,
    pub args: Vec<Instance>,
}
impl Repository {
    pub fn definition() -> TypeKey {
        TypeKey::definition("Repository", 1)
    }

    pub fn closed<T: 'static>() -> TypeKey {
        TypeKey::generic("Repository", vec![TypeKey::of::<T>()])
    }

    fn constructor(ordinal: usize, parameters: Vec<TypeKey>) -> ConstructorMetadata {
        ConstructorMetadata::new(Self::definition(), parameters, move |closed, args| {
            Ok(Instance::with_type(
                closed.clone(),
                Repository {
                    closed: closed.clone(),
                    ordinal,
                    args,
                },
            ))
        })
    }
}

pub(crate) fn fixture_registry() -> TypeRegistry {
    let widget = TypeKey::of::<Widget>();
    let pair = TypeKey::of::<Pair>();
    let consumer = TypeKey::of::<Consumer>();

    TypeRegistry::new()
        .add_constructor(ConstructorMetadata::new(
            widget.clone(),
            vec![TypeKey::of::<i32>()],
            |_, args| {
                let value = *argument::<i32>(&args, 0)?;
                Ok(Instance::new(Widget {
                    value: WidgetValue::Int(value),
                }))
            },
        ))
        .add_constructor(ConstructorMetadata::new(
            widget.clone(),
            vec![TypeKey::of::<String>()],
            |_, args| {
                let value = argument::<String>(&args, 0)?;
                Ok(Instance::new(Widget {
                    value: WidgetValue::Text(value.as_ref().clone()),
                }))
            },
        ))
        .add_constructor(
            ConstructorMetadata::new(widget.clone(), vec![], |_, _| {
                Err("private constructor invoked".into())
            })
            .private(),
        )
        .add_constructor(
            ConstructorMetadata::new(widget, vec![], |_, _| {
                Err("static constructor invoked".into())
            })
            .static_ctor(),
        )
        .add_constructor(ConstructorMetadata::new(pair.clone(), vec![], |_, _| {
            Ok(Instance::new(Pair { arity: 0 }))
        }))
        .add_constructor(ConstructorMetadata::new(
            pair,
            vec![TypeKey::of::<i32>(), TypeKey::of::<String>()],
            |_, _| Ok(Instance::new(Pair { arity: 2 })),
        ))
        .add_constructor(ConstructorMetadata::new(
            consumer.clone(),
            vec![TypeKey::object()],
            |_, _| Ok(Instance::new(Consumer { via: "object" })),
        ))
        .add_constructor(ConstructorMetadata::new(
            consumer,
            vec![TypeKey::of::<IService>()],
            |_, _| Ok(Instance::new(Consumer { via: "service" })),
        ))
        .add_constructor(ConstructorMetadata::new(
            TypeKey::of::<Batch>(),
            vec![TypeKey::array_of(TypeKey::of::<String>())],
            |_, _| Ok(Instance::new(Batch)),
        ))
        .add_constructor(Repository::constructor(0, vec![TypeKey::of::<String>()]))
        .add_constructor(Repository::constructor(1, vec![TypeKey::parameter(0)]))
        .add_constructor(Repository::constructor(
            2,
            vec![TypeKey::parameter(0), TypeKey::of::<i32>()],
        ))
        .add_supertype(TypeKey::of::<ServiceImpl>(), TypeKey::of::<IService>())
}

/// Resolution context answering from a fixed table
#[derive(Default)]
pub(crate) struct MapContext {
    values: HashMap<TypeKey, Instance>,
    pub requested: Vec<TypeKey>,
}
impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, instance: Instance) -> Self {
        let type_key = instance.type_key.clone();
        self.with_type(type_key, instance)
    }

    pub fn with_type(mut self, type_key: TypeKey, instance: Instance) -> Self {
        self.values.insert(type_key, instance);
        self
    }
}

impl ResolutionContext for MapContext {
    fn resolve(&mut self, type_key: &TypeKey) -> Result<Instance, DynError> {
        self.requested.push(type_key.clone());
        self.values
            .get(type_key)
            .cloned()
            .ok_or_else(|| format!("no value registered for '{type_key}'").into())
    }
}
