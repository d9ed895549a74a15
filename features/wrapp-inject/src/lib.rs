//! Wrapp Inject selects the constructor a registration is built through, and turns it
//! into reusable construction functions.
//!
//! It consists of three parts:
//! 1. [InjectionParameter] describes one desired constructor argument and decides which
//!    constructor parameters it is compatible with
//! 2. [InjectionConstructor] picks the single public instance constructor matching all
//!    declared parameters, once, when the registration adds its policies
//! 3. [PipelineBuilder] creates a construction function per requested type - constructors
//!    of open generic definitions are located again on every closed type by position
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use wrapp_inject::{
//!     argument, ConstructorMetadata, InjectionConstructor, InjectionMember, Instance,
//!     PolicySet, ResolutionContext, TypeKey, TypeRegistry,
//! };
//!
//! struct Widget(i32);
//!
//! struct Values;
//! impl ResolutionContext for Values {
//!     fn resolve(&mut self, _: &TypeKey) -> Result<Instance, wrapp_inject::DynError> {
//!         Ok(Instance::new(5_i32))
//!     }
//! }
//!
//! let registry = TypeRegistry::new().add_constructor(ConstructorMetadata::new(
//!     TypeKey::of::<Widget>(),
//!     vec![TypeKey::of::<i32>()],
//!     |_, args| Ok(Instance::new(Widget(*argument::<i32>(&args, 0)?))),
//! ));
//!
//! let mut member = InjectionConstructor::new(Arc::new(registry), [TypeKey::of::<i32>()]);
//! member
//!     .add_policies(&TypeKey::of::<Widget>(), None, None, &mut PolicySet::new())
//!     .unwrap();
//!
//! let factory = member.create_resolver_factory().unwrap();
//! let resolve = factory(&TypeKey::of::<Widget>()).unwrap();
//! let widget = resolve(&mut Values).unwrap();
//! assert_eq!(widget.downcast::<Widget>().unwrap().0, 5);
//! ```

pub mod constructor;
pub mod errors;
pub mod introspection;
pub mod member;
pub mod parameter;
pub mod pipeline;
pub mod policy;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use constructor::InjectionConstructor;
pub use errors::{BuildError, ConstructionError, InvokeError, PolicyError, SelectionError};
pub use introspection::{argument, ConstructorMetadata, Invoker, TypeIntrospector, TypeRegistry};
pub use member::InjectionMember;
pub use parameter::{InjectionParameter, ParameterResolver, ParameterValue};
pub use pipeline::{
    construction_function, ArgumentPipelineFactory, ArgumentResolver, OrdinalBinding,
    ParameterArguments, PipelineBuilder, PipelineFactory, ResolutionContext, ResolveMethod,
};
pub use policy::PolicySet;
pub use types::{DynError, FamilyId, Injectable, Instance, TypeKey};
