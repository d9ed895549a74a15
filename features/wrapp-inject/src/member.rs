use crate::{errors::SelectionError, policy::PolicySet, types::TypeKey};

/// Configures which member of a type gets injected
pub trait InjectionMember: Send + Sync {
    /// Allows the member to store the policies it needs into the registration
    ///
    /// Called once per registration. `implementation_type` is the type that will
    /// actually be built; when it is absent the `registered_type` is built.
    fn add_policies(
        &mut self,
        _registered_type: &TypeKey,
        _name: Option<&str>,
        _implementation_type: Option<&TypeKey>,
        _policies: &mut PolicySet,
    ) -> Result<(), SelectionError> {
        Ok(())
    }
}
