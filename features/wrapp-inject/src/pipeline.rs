use std::sync::Arc;

use crate::{
    errors::{BuildError, ConstructionError},
    introspection::{ConstructorMetadata, TypeIntrospector},
    parameter::{InjectionParameter, ParameterResolver},
    types::{DynError, Instance, TypeKey},
};

/// Per resolution state, owned by the surrounding container
///
/// Construction functions never look into the context, they only hand it to
/// the argument pipeline.
pub trait ResolutionContext {
    /// Resolves an instance of the requested type
    fn resolve(&mut self, type_key: &TypeKey) -> Result<Instance, DynError>;
}

/// Builds one instance per call
pub type ResolveMethod =
    Arc<dyn Fn(&mut dyn ResolutionContext) -> Result<Instance, ConstructionError> + Send + Sync>;

/// Produces the full, ordered argument list of a constructor per call
pub type ArgumentResolver =
    Arc<dyn Fn(&mut dyn ResolutionContext) -> Result<Vec<Instance>, DynError> + Send + Sync>;

/// Creates a construction function for a concrete (possibly freshly closed) type
pub type PipelineFactory = Arc<dyn Fn(&TypeKey) -> Result<ResolveMethod, BuildError> + Send + Sync>;

/// Turns declared parameters into per call argument producers
pub trait ArgumentPipelineFactory: Send + Sync {
    fn create(
        &self,
        target: &TypeKey,
        constructor: &ConstructorMetadata,
    ) -> Result<ArgumentResolver, BuildError>;
}

/// Default argument pipeline, one [ParameterResolver] per declared parameter
#[derive(Debug, Clone)]
pub struct ParameterArguments {
    parameters: Arc<[InjectionParameter]>,
}
impl ParameterArguments {
    pub fn new(parameters: impl Into<Arc<[InjectionParameter]>>) -> Self {
        ParameterArguments {
            parameters: parameters.into(),
        }
    }
}

impl ArgumentPipelineFactory for ParameterArguments {
    fn create(
        &self,
        target: &TypeKey,
        constructor: &ConstructorMetadata,
    ) -> Result<ArgumentResolver, BuildError> {
        if self.parameters.len() != constructor.parameters().len() {
            return Err(BuildError::ArgumentCount {
                constructor: constructor.to_string(),
                expected: constructor.parameters().len(),
                actual: self.parameters.len(),
            });
        }

        let resolvers: Vec<ParameterResolver> = self
            .parameters
            .iter()
            .zip(constructor.parameters())
            .map(|(parameter, parameter_type)| parameter.resolver(parameter_type))
            .collect();

        tracing::trace!("Created {} argument resolvers for {}", resolvers.len(), target);

        Ok(Arc::new(
            move |context: &mut dyn ResolutionContext| -> Result<Vec<Instance>, DynError> {
                resolvers
                    .iter()
                    .map(|resolver| resolver.produce(context))
                    .collect()
            },
        ))
    }
}

/// Position of a constructor within its open generic definition
///
/// Lets a constructor selected once against `Foo<_>` be located again on
/// `Foo<i32>`, `Foo<String>`, ... without rerunning selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalBinding {
    pub origin: TypeKey,
    pub ordinal: usize,
}

impl OrdinalBinding {
    pub fn new(
        constructor: &ConstructorMetadata,
        introspector: &dyn TypeIntrospector,
    ) -> Result<Self, BuildError> {
        let origin = constructor.declaring_type().clone();
        let ordinal = introspector
            .list_constructors(&origin)
            .iter()
            .position(|candidate| candidate == constructor)
            .ok_or_else(|| BuildError::UnknownConstructor {
                origin: origin.clone(),
                constructor: constructor.to_string(),
            })?;

        Ok(OrdinalBinding { origin, ordinal })
    }

    /// The constructor at the same position on `closed`
    pub fn resolve(
        &self,
        closed: &TypeKey,
        introspector: &dyn TypeIntrospector,
    ) -> Result<ConstructorMetadata, BuildError> {
        if introspector.generic_definition_of(closed).as_ref() != Some(&self.origin) {
            return Err(BuildError::NotClosedFrom {
                type_key: closed.clone(),
                origin: self.origin.clone(),
            });
        }

        introspector
            .list_constructors(closed)
            .into_iter()
            .nth(self.ordinal)
            .ok_or_else(|| BuildError::ConstructorMissing {
                type_key: closed.clone(),
                ordinal: self.ordinal,
            })
    }
}

/// Builds construction functions for a selected constructor
#[derive(Clone)]
pub struct PipelineBuilder {
    introspector: Arc<dyn TypeIntrospector>,
    arguments: Arc<dyn ArgumentPipelineFactory>,
}

impl PipelineBuilder {
    pub fn new(
        introspector: Arc<dyn TypeIntrospector>,
        arguments: Arc<dyn ArgumentPipelineFactory>,
    ) -> Self {
        PipelineBuilder {
            introspector,
            arguments,
        }
    }

    /// Returns a factory which creates a construction function per requested type
    ///
    /// Constructors declared by an open generic definition are bound by position
    /// and located again on every closed type handed to the factory.
    pub fn build(&self, selected: &ConstructorMetadata) -> Result<PipelineFactory, BuildError> {
        let arguments = self.arguments.clone();

        if !self
            .introspector
            .is_generic_definition(selected.declaring_type())
        {
            let constructor = selected.clone();
            return Ok(Arc::new(
                move |target: &TypeKey| -> Result<ResolveMethod, BuildError> {
                    let resolver = arguments.create(target, &constructor)?;
                    Ok(construction_function(
                        target.clone(),
                        constructor.clone(),
                        resolver,
                    ))
                },
            ));
        }

        let binding = OrdinalBinding::new(selected, self.introspector.as_ref())?;
        tracing::debug!(
            "Bound constructor {} of {} at position {}",
            selected,
            binding.origin,
            binding.ordinal
        );

        let introspector = self.introspector.clone();
        Ok(Arc::new(move |closed: &TypeKey| -> Result<ResolveMethod, BuildError> {
            let constructor = binding.resolve(closed, introspector.as_ref())?;
            let resolver = arguments.create(closed, &constructor)?;
            Ok(construction_function(closed.clone(), constructor, resolver))
        }))
    }
}

/// Produces the arguments, then invokes the constructor
///
/// Failures of either step surface as [ConstructionError] for `target`.
pub fn construction_function(
    target: TypeKey,
    constructor: ConstructorMetadata,
    arguments: ArgumentResolver,
) -> ResolveMethod {
    Arc::new(
        move |context: &mut dyn ResolutionContext| -> Result<Instance, ConstructionError> {
            let args = arguments(context).map_err(|error| {
                tracing::debug!("Failed producing arguments for {}: {}", target, error);
                ConstructionError::new(target.clone(), error)
            })?;

            constructor.invoke(args).map_err(|error| {
                tracing::debug!("Constructor {} failed: {}", constructor, error);
                ConstructionError::new(target.clone(), error)
            })
        },
    )
}
