use std::{collections::HashMap, error::Error, sync::Arc};

use tracing_subscriber::EnvFilter;
use wrapp_inject::{
    argument, ConstructorMetadata, DynError, InjectionConstructor, InjectionMember, Instance,
    PolicySet, ResolutionContext, TypeKey, TypeRegistry,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let registry = TypeRegistry::new()
        .add_constructor(ConstructorMetadata::new(
            TypeKey::of::<Test>(),
            vec![TypeKey::of::<i32>()],
            |_, args| Ok(Instance::new(Test::Number(*argument::<i32>(&args, 0)?))),
        ))
        .add_constructor(ConstructorMetadata::new(
            TypeKey::of::<Test>(),
            vec![TypeKey::of::<String>()],
            |_, args| {
                let text = argument::<String>(&args, 0)?;
                Ok(Instance::new(Test::Text(text.as_ref().clone())))
            },
        ));

    let mut registration = InjectionConstructor::new(Arc::new(registry), [TypeKey::of::<i32>()]);
    let mut policies = PolicySet::new();
    registration.add_policies(&TypeKey::of::<Test>(), None, None, &mut policies)?;

    let factory = registration.create_resolver_factory()?;
    let resolve = factory(&TypeKey::of::<Test>())?;

    let mut context = TestContext(HashMap::from([(
        TypeKey::of::<i32>(),
        Instance::new(5_i32),
    )]));
    let test = resolve(&mut context)?;

    match test.downcast_ref::<Test>() {
        Some(Test::Number(number)) => println!("Built Test from number {number}"),
        Some(Test::Text(text)) => println!("Built Test from text '{text}'"),
        None => println!("Built unexpected {:?}", test),
    }
    Ok(())
}

enum Test {
    Number(i32),
    Text(String),
}

struct TestContext(HashMap<TypeKey, Instance>);
impl ResolutionContext for TestContext {
    fn resolve(&mut self, type_key: &TypeKey) -> Result<Instance, DynError> {
        self.0
            .get(type_key)
            .cloned()
            .ok_or_else(|| format!("'{type_key}' is not registered").into())
    }
}
