use std::{fmt::Debug, sync::Arc};

use crate::{
    errors::{BuildError, SelectionError},
    introspection::{signature, ConstructorMetadata, TypeIntrospector},
    member::InjectionMember,
    parameter::InjectionParameter,
    pipeline::{ArgumentPipelineFactory, ParameterArguments, PipelineBuilder, PipelineFactory},
    policy::PolicySet,
    types::TypeKey,
};

/// Configures the container to build a type through one specific constructor
///
/// The constructor is chosen once, when the registration adds its policies, by
/// matching the declared parameters against every public instance constructor.
/// Exactly one constructor has to match.
#[derive(Clone)]
pub struct InjectionConstructor {
    introspector: Arc<dyn TypeIntrospector>,
    parameters: Vec<InjectionParameter>,
    constructor: Option<ConstructorMetadata>,
}
impl Debug for InjectionConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionConstructor")
            .field("parameters", &self.parameters)
            .field("constructor", &self.constructor)
            .finish_non_exhaustive()
    }
}

impl InjectionConstructor {
    /// Looks for a constructor taking the given parameters
    ///
    /// Bare [TypeKey]s are resolved by type, bare [crate::types::Instance]s are passed as is.
    pub fn new<P: Into<InjectionParameter>>(
        introspector: Arc<dyn TypeIntrospector>,
        parameters: impl IntoIterator<Item = P>,
    ) -> Self {
        InjectionConstructor {
            introspector,
            parameters: parameters.into_iter().map(Into::into).collect(),
            constructor: None,
        }
    }

    /// Looks for the parameterless constructor
    pub fn default_constructor(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self::new(introspector, Vec::<InjectionParameter>::new())
    }

    /// Uses the given constructor, no selection takes place
    ///
    /// Its parameters are resolved by their declared types.
    pub fn from_constructor(
        introspector: Arc<dyn TypeIntrospector>,
        constructor: ConstructorMetadata,
    ) -> Self {
        InjectionConstructor {
            introspector,
            parameters: constructor
                .parameters()
                .iter()
                .cloned()
                .map(InjectionParameter::of_type)
                .collect(),
            constructor: Some(constructor),
        }
    }

    /// The selected constructor, if selection already happened
    pub fn constructor(&self) -> Option<&ConstructorMetadata> {
        self.constructor.as_ref()
    }

    pub fn parameters(&self) -> &[InjectionParameter] {
        &self.parameters
    }

    /// True if the constructor parameters match the declared parameters by count and position
    pub fn matches(&self, parameter_types: &[TypeKey]) -> bool {
        parameter_types.len() == self.parameters.len()
            && self
                .parameters
                .iter()
                .zip(parameter_types)
                .all(|(parameter, parameter_type)| {
                    parameter.matches_type(parameter_type, self.introspector.as_ref())
                })
    }

    /// Finds the single public instance constructor of `type_key` matching the parameters
    pub fn select(&self, type_key: &TypeKey) -> Result<ConstructorMetadata, SelectionError> {
        let matching: Vec<ConstructorMetadata> = self
            .introspector
            .list_constructors(type_key)
            .into_iter()
            .filter(|constructor| constructor.is_public() && !constructor.is_static())
            .filter(|constructor| self.matches(constructor.parameters()))
            .collect();

        match matching.as_slice() {
            [] => Err(SelectionError::NoMatchingConstructor {
                type_key: type_key.clone(),
                signature: self.signature(),
            }),
            [selected] => Ok(selected.clone()),
            [first, second, ..] => {
                tracing::warn!(
                    "{} constructors of {} match ( {} )",
                    matching.len(),
                    type_key,
                    self.signature()
                );
                Err(SelectionError::AmbiguousConstructor {
                    type_key: type_key.clone(),
                    first: first.to_string(),
                    second: second.to_string(),
                    matches: matching.len(),
                    signature: self.signature(),
                })
            }
        }
    }

    /// Returns a factory producing a construction function per requested type
    ///
    /// Arguments are produced with [ParameterArguments] over the declared parameters.
    pub fn create_resolver_factory(&self) -> Result<PipelineFactory, BuildError> {
        let arguments = ParameterArguments::new(self.parameters.clone());
        self.create_resolver_factory_with(Arc::new(arguments))
    }

    /// Same as [Self::create_resolver_factory] with a custom argument pipeline
    pub fn create_resolver_factory_with(
        &self,
        arguments: Arc<dyn ArgumentPipelineFactory>,
    ) -> Result<PipelineFactory, BuildError> {
        let constructor = self.constructor.as_ref().ok_or(BuildError::NotSelected)?;
        PipelineBuilder::new(self.introspector.clone(), arguments).build(constructor)
    }

    fn signature(&self) -> String {
        signature(self.parameters.iter().map(InjectionParameter::parameter_type))
    }
}

impl InjectionMember for InjectionConstructor {
    fn add_policies(
        &mut self,
        registered_type: &TypeKey,
        name: Option<&str>,
        implementation_type: Option<&TypeKey>,
        policies: &mut PolicySet,
    ) -> Result<(), SelectionError> {
        let type_key = implementation_type.unwrap_or(registered_type);

        match &self.constructor {
            Some(constructor) => {
                let declaring = constructor.declaring_type();
                let builds_type = declaring == type_key
                    || (self.introspector.is_generic_definition(declaring)
                        && type_key.definition_of().as_ref() == Some(declaring));
                if !builds_type {
                    return Err(SelectionError::ForeignConstructor {
                        type_key: type_key.clone(),
                        constructor: constructor.to_string(),
                    });
                }
            }
            None => {
                tracing::debug!(
                    "Selecting constructor of {} ({}) for ( {} )",
                    type_key,
                    name.unwrap_or("default"),
                    self.signature()
                );
                let selected = self.select(type_key)?;
                tracing::debug!("Selected constructor {}", selected);
                self.constructor = Some(selected);
            }
        }

        if policies.set(self.clone()) {
            tracing::debug!("Replaced constructor policy of {}", type_key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_support::{
            fixture_registry, Batch, Consumer, IService, MapContext, Pair, Repository, ServiceImpl,
            Widget, WidgetValue,
        },
        types::Instance,
    };

    fn introspector() -> Arc<dyn TypeIntrospector> {
        Arc::new(fixture_registry())
    }

    fn register(
        member: &mut InjectionConstructor,
        type_key: TypeKey,
    ) -> Result<PolicySet, SelectionError> {
        let mut policies = PolicySet::new();
        member.add_policies(&type_key, None, None, &mut policies)?;
        Ok(policies)
    }

    #[test]
    fn zero_parameters_select_the_parameterless_constructor() {
        let mut member = InjectionConstructor::default_constructor(introspector());
        register(&mut member, TypeKey::of::<Pair>()).unwrap();

        let selected = member.constructor().unwrap();
        assert!(selected.parameters().is_empty());
        assert_eq!(selected.declaring_type(), &TypeKey::of::<Pair>());

        let resolve = member.create_resolver_factory().unwrap()(&TypeKey::of::<Pair>()).unwrap();
        let pair = resolve(&mut MapContext::new()).unwrap();
        assert_eq!(pair.downcast::<Pair>().unwrap().arity, 0);
    }

    #[test]
    fn single_public_constructor_is_selected_without_parameters() {
        let solo = TypeKey::named("Solo");
        let introspector: Arc<dyn TypeIntrospector> = Arc::new(
            fixture_registry()
                .add_constructor(
                    ConstructorMetadata::new(solo.clone(), vec![TypeKey::of::<i32>()], |_, _| {
                        Err("private constructor invoked".into())
                    })
                    .private(),
                )
                .add_constructor(ConstructorMetadata::new(solo.clone(), vec![], |_, _| {
                    Ok(Instance::new(7_u8))
                })),
        );
        let mut member = InjectionConstructor::default_constructor(introspector);
        register(&mut member, solo.clone()).unwrap();

        assert!(member.constructor().unwrap().parameters().is_empty());
        let resolve = member.create_resolver_factory().unwrap()(&solo).unwrap();
        assert_eq!(*resolve(&mut MapContext::new()).unwrap().downcast::<u8>().unwrap(), 7);
    }

    #[test]
    fn private_and_static_constructors_are_ignored() {
        // Widget only has a private and a static parameterless constructor
        let mut member = InjectionConstructor::default_constructor(introspector());

        assert!(matches!(
            register(&mut member, TypeKey::of::<Widget>()),
            Err(SelectionError::NoMatchingConstructor { .. })
        ));
        assert!(member.constructor().is_none());
    }

    #[test]
    fn arity_decides_between_constructors() {
        let mut two = InjectionConstructor::new(
            introspector(),
            [TypeKey::of::<i32>(), TypeKey::of::<String>()],
        );
        register(&mut two, TypeKey::of::<Pair>()).unwrap();
        assert_eq!(two.constructor().unwrap().parameters().len(), 2);

        let mut one = InjectionConstructor::new(introspector(), [TypeKey::of::<i32>()]);
        let error = register(&mut one, TypeKey::of::<Pair>()).unwrap_err();
        assert!(matches!(error, SelectionError::NoMatchingConstructor { .. }));
        assert!(error.to_string().contains("( i32 )"));
    }

    #[test]
    fn parameters_must_match_positionally() {
        let mut swapped = InjectionConstructor::new(
            introspector(),
            [TypeKey::of::<String>(), TypeKey::of::<i32>()],
        );

        assert!(matches!(
            register(&mut swapped, TypeKey::of::<Pair>()),
            Err(SelectionError::NoMatchingConstructor { .. })
        ));
    }

    #[test]
    fn overlapping_constructors_are_ambiguous() {
        // ServiceImpl is both an Object and an IService
        let mut member =
            InjectionConstructor::new(introspector(), [Instance::new(ServiceImpl)]);

        let error = register(&mut member, TypeKey::of::<Consumer>()).unwrap_err();
        match &error {
            SelectionError::AmbiguousConstructor { matches, .. } => assert_eq!(*matches, 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert!(error.to_string().contains("Unable to disambiguate"));
        assert!(member.constructor().is_none());
    }

    #[test]
    fn interface_descriptor_also_matches_object_parameter() {
        let mut member = InjectionConstructor::new(introspector(), [TypeKey::of::<IService>()]);

        // IService is assignable to Object as well - still ambiguous
        assert!(matches!(
            register(&mut member, TypeKey::of::<Consumer>()),
            Err(SelectionError::AmbiguousConstructor { .. })
        ));
    }

    #[test]
    fn int_descriptor_picks_the_int_constructor() {
        let mut member = InjectionConstructor::new(introspector(), [TypeKey::of::<i32>()]);
        let policies = register(&mut member, TypeKey::of::<Widget>()).unwrap();

        assert_eq!(
            member.constructor().unwrap().parameters(),
            &[TypeKey::of::<i32>()]
        );

        let stored = policies.get::<InjectionConstructor>().unwrap().unwrap();
        assert_eq!(stored.constructor(), member.constructor());
    }

    #[test]
    fn array_descriptor_selects_any_array_constructor() {
        let mut member = InjectionConstructor::new(
            introspector(),
            [TypeKey::array_of(TypeKey::of::<i32>())],
        );
        register(&mut member, TypeKey::of::<Batch>()).unwrap();

        assert_eq!(
            member.constructor().unwrap().parameters(),
            &[TypeKey::array_of(TypeKey::of::<String>())]
        );
    }

    #[test]
    fn implementation_type_takes_precedence() {
        let mut member = InjectionConstructor::new(introspector(), [TypeKey::of::<String>()]);
        let mut policies = PolicySet::new();

        member
            .add_policies(
                &TypeKey::named("IWidget"),
                Some("text"),
                Some(&TypeKey::of::<Widget>()),
                &mut policies,
            )
            .unwrap();

        assert_eq!(
            member.constructor().unwrap().declaring_type(),
            &TypeKey::of::<Widget>()
        );
        assert!(policies.contains::<InjectionConstructor>());
    }

    #[test]
    fn preselected_constructor_skips_selection() {
        let registry = fixture_registry();
        let text = registry.list_constructors(&TypeKey::of::<Widget>())[1].clone();
        let mut member = InjectionConstructor::from_constructor(Arc::new(registry), text.clone());

        register(&mut member, TypeKey::of::<Widget>()).unwrap();
        assert_eq!(member.constructor(), Some(&text));
        assert_eq!(member.parameters()[0].parameter_type(), &TypeKey::of::<String>());

        assert!(matches!(
            register(&mut member, TypeKey::of::<Pair>()),
            Err(SelectionError::ForeignConstructor { .. })
        ));
    }

    #[test]
    fn factory_requires_selection() {
        let member = InjectionConstructor::new(introspector(), [TypeKey::of::<i32>()]);
        assert!(matches!(
            member.create_resolver_factory(),
            Err(BuildError::NotSelected)
        ));
    }

    #[test]
    fn literal_values_are_passed_through() {
        let mut member =
            InjectionConstructor::new(introspector(), [Instance::new("hello".to_string())]);
        register(&mut member, TypeKey::of::<Widget>()).unwrap();

        let resolve = member.create_resolver_factory().unwrap()(&TypeKey::of::<Widget>()).unwrap();
        let mut context = MapContext::new();
        let widget = resolve(&mut context).unwrap();

        assert_eq!(
            widget.downcast::<Widget>().unwrap().value,
            WidgetValue::Text("hello".to_string())
        );
        assert!(context.requested.is_empty());
    }

    #[test]
    fn repeated_invocations_build_independent_instances() {
        let mut member = InjectionConstructor::new(introspector(), [TypeKey::of::<i32>()]);
        register(&mut member, TypeKey::of::<Widget>()).unwrap();
        let resolve = member.create_resolver_factory().unwrap()(&TypeKey::of::<Widget>()).unwrap();

        let mut first_context = MapContext::new().with(Instance::new(1_i32));
        let mut second_context = MapContext::new().with(Instance::new(2_i32));
        let first = resolve(&mut first_context).unwrap();
        let second = resolve(&mut second_context).unwrap();

        assert!(!first.same_instance(&second));
        assert_eq!(first.downcast::<Widget>().unwrap().value, WidgetValue::Int(1));
        assert_eq!(second.downcast::<Widget>().unwrap().value, WidgetValue::Int(2));
        assert_eq!(first_context.requested, vec![TypeKey::of::<i32>()]);
    }

    #[test]
    fn open_generic_constructor_is_relocated_per_closed_type() {
        // (T) is the constructor at position 1 of Repository<_>
        let mut member = InjectionConstructor::new(introspector(), [TypeKey::parameter(0)]);
        register(&mut member, Repository::definition()).unwrap();
        assert_eq!(
            member.constructor().unwrap().parameters(),
            &[TypeKey::parameter(0)]
        );

        let factory = member.create_resolver_factory().unwrap();
        let for_ints = factory(&Repository::closed::<i32>()).unwrap();
        let for_text = factory(&Repository::closed::<String>()).unwrap();

        let mut context = MapContext::new()
            .with(Instance::new(9_i32))
            .with(Instance::new("items".to_string()));

        let ints = for_ints(&mut context).unwrap();
        let text = for_text(&mut context).unwrap();

        assert_eq!(ints.type_key, Repository::closed::<i32>());
        assert_eq!(text.type_key, Repository::closed::<String>());

        let ints = ints.downcast::<Repository>().unwrap();
        let text = text.downcast::<Repository>().unwrap();
        assert_eq!((ints.ordinal, text.ordinal), (1, 1));
        assert_eq!(ints.closed, Repository::closed::<i32>());
        assert_eq!(*ints.args[0].downcast::<i32>().unwrap(), 9);
        assert_eq!(*text.args[0].downcast::<String>().unwrap(), "items");
        assert_eq!(
            context.requested,
            vec![TypeKey::of::<i32>(), TypeKey::of::<String>()]
        );
    }

    #[test]
    fn open_definition_descriptor_matches_closed_parameter_family() {
        let introspector: Arc<dyn TypeIntrospector> = Arc::new(
            fixture_registry().add_constructor(ConstructorMetadata::new(
                TypeKey::named("Service"),
                vec![Repository::closed::<i32>()],
                |_, _| Ok(Instance::new(())),
            )),
        );
        let mut member = InjectionConstructor::new(introspector, [Repository::definition()]);

        register(&mut member, TypeKey::named("Service")).unwrap();
        assert_eq!(
            member.constructor().unwrap().parameters(),
            &[Repository::closed::<i32>()]
        );
    }

    #[test]
    fn interface_descriptor_is_resolved_by_its_own_type() {
        let introspector: Arc<dyn TypeIntrospector> = Arc::new(
            fixture_registry().add_constructor(ConstructorMetadata::new(
                TypeKey::named("Holder"),
                vec![TypeKey::object()],
                |_, args| Ok(args[0].clone()),
            )),
        );
        let mut member = InjectionConstructor::new(introspector, [TypeKey::of::<IService>()]);
        register(&mut member, TypeKey::named("Holder")).unwrap();

        let resolve = member.create_resolver_factory().unwrap()(&TypeKey::named("Holder")).unwrap();
        let mut context = MapContext::new()
            .with_type(TypeKey::of::<IService>(), Instance::new(ServiceImpl));
        let built = resolve(&mut context).unwrap();

        assert_eq!(built.type_key, TypeKey::of::<ServiceImpl>());
        assert_eq!(context.requested, vec![TypeKey::of::<IService>()]);
    }
}
