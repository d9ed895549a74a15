use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use crate::{errors::PolicyError, types::Injectable};

/// Policies of a single registration
///
/// Policies are stored and retrieved based on their type, at most one per type.
#[derive(Debug, Default, Clone)]
pub struct PolicySet {
    policies: HashMap<TypeId, Arc<dyn Any + Send + Sync + 'static>>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the policy of the specified type
    pub fn get<T: Injectable>(&self) -> Result<Option<Arc<T>>, PolicyError> {
        let type_id = TypeId::of::<T>();

        self.policies
            .get(&type_id)
            .map(|entry| entry.clone().downcast())
            .transpose()
            .map_err(|_| PolicyError::DowncastFailed {
                type_id,
                type_name: type_name::<T>(),
            })
    }

    /// Stores the policy, replacing any policy of the same type
    ///
    /// Returns true if a policy was replaced
    pub fn set<T: Injectable>(&mut self, policy: T) -> bool {
        self.policies
            .insert(TypeId::of::<T>(), Arc::new(policy))
            .is_some()
    }

    /// Add a policy, failing with [PolicyError::AlreadyRegistered] if one of the
    /// same type is already stored
    pub fn try_add<T: Injectable>(&mut self, policy: T) -> Result<&mut Self, PolicyError> {
        let type_id = TypeId::of::<T>();

        if self.policies.contains_key(&type_id) {
            return Err(PolicyError::AlreadyRegistered(type_name::<T>()));
        }

        self.policies.insert(type_id, Arc::new(policy));
        Ok(self)
    }

    pub fn contains<T: Injectable>(&self) -> bool {
        self.policies.contains_key(&TypeId::of::<T>())
    }

    /// Removes the policy of the given type, returns true if there was one
    pub fn clear<T: Injectable>(&mut self) -> bool {
        self.policies.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
