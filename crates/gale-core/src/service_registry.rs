// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A type-keyed registry owning the engine's long-lived subsystems.
//!
//! The [`SubsystemRegistry`] stores at most one instance per concrete type and
//! remembers the order in which instances were registered. Teardown runs in
//! the reverse of that order, so a subsystem registered after the ones it
//! depends on is always destroyed before them.
//!
//! The registry is owned by the engine and is only touched from the thread
//! that drives the frame loop, so it performs no locking and its instances do
//! not need to be `Send`.

use std::any::{Any, TypeId};
use std::collections::HashMap;

struct RegistryEntry {
    type_name: &'static str,
    instance: Box<dyn Any>,
}

/// A subsystem registry keyed by [`TypeId`], preserving registration order.
///
/// # Example
///
/// ```rust
/// use gale_core::service_registry::SubsystemRegistry;
///
/// struct ResourceCache { dirs: usize }
///
/// let mut registry = SubsystemRegistry::new();
/// registry.register(ResourceCache { dirs: 2 });
///
/// let cache = registry.get::<ResourceCache>().unwrap();
/// assert_eq!(cache.dirs, 2);
/// ```
#[derive(Default)]
pub struct SubsystemRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<TypeId, usize>,
}

impl SubsystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers `instance` as the subsystem of type `T`.
    ///
    /// If a subsystem of the same type was already registered, its mapping is
    /// replaced and the previous instance is handed back to the caller instead
    /// of being destroyed. The new instance is placed last in teardown order.
    pub fn register<T: 'static>(&mut self, instance: T) -> Option<T> {
        let previous = self.remove::<T>();
        let type_name = std::any::type_name::<T>();
        log::debug!("Registered subsystem {type_name}");

        self.index.insert(TypeId::of::<T>(), self.entries.len());
        self.entries.push(RegistryEntry {
            type_name,
            instance: Box::new(instance),
        });
        previous
    }

    /// Returns a shared reference to the subsystem of type `T`, if registered.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<&T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        self.entries[slot].instance.downcast_ref::<T>()
    }

    /// Returns a mutable reference to the subsystem of type `T`, if registered.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        self.entries[slot].instance.downcast_mut::<T>()
    }

    /// Returns `true` if a subsystem of type `T` is registered.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Removes the subsystem of type `T` and returns it to the caller.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        let slot = self.index.remove(&TypeId::of::<T>())?;
        let entry = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        entry.instance.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Returns the number of registered subsystems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no subsystems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the type names of the registered subsystems in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.type_name)
    }

    /// Destroys every subsystem in reverse registration order.
    pub fn teardown(&mut self) {
        self.index.clear();
        while let Some(entry) = self.entries.pop() {
            log::debug!("Destroying subsystem {}", entry.type_name);
            drop(entry.instance);
        }
    }
}

impl Drop for SubsystemRegistry {
    fn drop(&mut self) {
        self.teardown();
    }
}
