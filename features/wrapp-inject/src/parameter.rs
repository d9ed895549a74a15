use crate::{
    introspection::TypeIntrospector,
    pipeline::ResolutionContext,
    types::{DynError, Injectable, Instance, TypeKey},
};

/// What a [InjectionParameter] holds besides its type
#[derive(Debug, Clone)]
pub enum ParameterValue {
    /// A type - either to resolve, or a type literal
    Type(TypeKey),
    /// A concrete value passed as is
    Instance(Instance),
}

/// One desired constructor argument
///
/// Either a type to resolve, a concrete value, or a value presented as a given type.
#[derive(Debug, Clone)]
pub struct InjectionParameter {
    parameter_type: TypeKey,
    parameter_value: ParameterValue,
    has_value: bool,
}

impl InjectionParameter {
    /// Parameter matched and resolved by type only
    pub fn of_type(type_key: TypeKey) -> Self {
        InjectionParameter {
            parameter_type: type_key.clone(),
            parameter_value: ParameterValue::Type(type_key),
            has_value: false,
        }
    }

    pub fn of<T: 'static + ?Sized>() -> Self {
        Self::of_type(TypeKey::of::<T>())
    }

    /// Literal value, typed as the instance's own type
    ///
    /// A value holding a [TypeKey] becomes a type literal.
    pub fn from_value(instance: Instance) -> Self {
        if let Some(type_key) = instance.downcast_ref::<TypeKey>() {
            return Self::type_literal(type_key.clone());
        }

        InjectionParameter {
            parameter_type: instance.type_key.clone(),
            parameter_value: ParameterValue::Instance(instance),
            has_value: true,
        }
    }

    /// A type passed as value - its declared type is `Type`
    pub fn type_literal(type_key: TypeKey) -> Self {
        InjectionParameter {
            parameter_type: TypeKey::type_marker(),
            parameter_value: ParameterValue::Type(type_key),
            has_value: true,
        }
    }

    /// Literal value presented as `type_key`
    pub fn with_value(type_key: TypeKey, instance: Instance) -> Self {
        InjectionParameter {
            parameter_type: type_key,
            parameter_value: ParameterValue::Instance(instance),
            has_value: true,
        }
    }

    pub fn typed<T: Injectable>(value: T) -> Self {
        Self::with_value(TypeKey::of::<T>(), Instance::new(value))
    }

    pub fn parameter_type(&self) -> &TypeKey {
        &self.parameter_type
    }

    pub fn parameter_value(&self) -> &ParameterValue {
        &self.parameter_value
    }

    pub fn has_value(&self) -> bool {
        self.has_value
    }

    /// The type used for matching
    ///
    /// A type literal matches as the type it denotes, not as `Type`.
    pub fn effective_type(&self) -> &TypeKey {
        match &self.parameter_value {
            ParameterValue::Type(type_key) if self.parameter_type.is_type_marker() => type_key,
            _ => &self.parameter_type,
        }
    }

    fn value_type(&self) -> Option<&TypeKey> {
        match &self.parameter_value {
            ParameterValue::Type(type_key) => Some(type_key),
            ParameterValue::Instance(_) => None,
        }
    }

    /// Test if this parameter is compatible with a constructor parameter of type `candidate`
    pub fn matches_type(&self, candidate: &TypeKey, introspector: &dyn TypeIntrospector) -> bool {
        let effective = self.effective_type();

        if introspector.is_assignable_from(candidate, effective) {
            return true;
        }

        // Arrays only match as a family, element types are not compared
        let array_like = effective.is_array()
            || self.parameter_type.is_array_marker()
            || (self.parameter_type.is_type_marker()
                && self.value_type().is_some_and(TypeKey::is_array_marker));
        if array_like && (candidate.is_array() || candidate.is_array_marker()) {
            return true;
        }

        if introspector.is_generic_definition(effective)
            && introspector.generic_definition_of(candidate).as_ref() == Some(effective)
        {
            return true;
        }

        self.value_type() == Some(candidate)
    }

    /// Produces the argument for a constructor parameter of type `parameter_type`
    ///
    /// Values are passed as is. Open types resolve as the (closed) constructor
    /// parameter type, everything else as the declared type.
    pub fn resolver(&self, parameter_type: &TypeKey) -> ParameterResolver {
        if self.has_value {
            return match &self.parameter_value {
                ParameterValue::Instance(instance) => ParameterResolver::Value(instance.clone()),
                ParameterValue::Type(type_key) => ParameterResolver::Value(Instance::with_type(
                    TypeKey::type_marker(),
                    type_key.clone(),
                )),
            };
        }

        let effective = self.effective_type();
        if effective.is_open() || effective.is_array_marker() {
            ParameterResolver::Resolve(parameter_type.clone())
        } else {
            ParameterResolver::Resolve(effective.clone())
        }
    }
}

impl From<TypeKey> for InjectionParameter {
    fn from(type_key: TypeKey) -> Self {
        InjectionParameter::of_type(type_key)
    }
}
impl From<Instance> for InjectionParameter {
    fn from(instance: Instance) -> Self {
        InjectionParameter::from_value(instance)
    }
}

/// Per call producer of a single argument
#[derive(Debug, Clone)]
pub enum ParameterResolver {
    Value(Instance),
    Resolve(TypeKey),
}
impl ParameterResolver {
    pub fn produce(&self, context: &mut dyn ResolutionContext) -> Result<Instance, DynError> {
        match self {
            ParameterResolver::Value(instance) => Ok(instance.clone()),
            ParameterResolver::Resolve(type_key) => context.resolve(type_key),
        }
    }
}
