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

//! Ordered, synchronous phase-callback registrations.

use super::{FrameEvent, FramePhase};
use crate::service_registry::SubsystemRegistry;

/// A callback notified when its frame phase is dispatched.
///
/// Callbacks receive the frame payload and mutable access to the subsystem
/// registry, which is how logic, rendering and UI code reach the services
/// they work with.
pub type PhaseCallback = Box<dyn FnMut(&FrameEvent, &mut SubsystemRegistry)>;

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    callback: PhaseCallback,
}

/// Per-phase lists of callbacks, invoked in subscription order.
pub struct PhaseDispatcher {
    phases: [Vec<Subscription>; FramePhase::COUNT],
    next_id: u64,
}

impl PhaseDispatcher {
    /// Creates a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self {
            phases: Default::default(),
            next_id: 0,
        }
    }

    /// Subscribes `callback` to `phase`, after every existing subscriber of that phase.
    pub fn subscribe<F>(&mut self, phase: FramePhase, callback: F) -> SubscriptionId
    where
        F: FnMut(&FrameEvent, &mut SubsystemRegistry) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.phases[phase.slot()].push(Subscription {
            id,
            callback: Box::new(callback),
        });
        log::debug!("Subscribed {:?} to {}", id, phase.name());
        id
    }

    /// Removes a subscription. Returns `false` if it was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscribers in &mut self.phases {
            if let Some(position) = subscribers.iter().position(|s| s.id == id) {
                subscribers.remove(position);
                return true;
            }
        }
        false
    }

    /// Number of callbacks subscribed to `phase`.
    pub fn subscriber_count(&self, phase: FramePhase) -> usize {
        self.phases[phase.slot()].len()
    }

    /// Invokes every subscriber of `phase` in subscription order.
    pub fn dispatch(
        &mut self,
        phase: FramePhase,
        event: &FrameEvent,
        registry: &mut SubsystemRegistry,
    ) {
        for subscription in &mut self.phases[phase.slot()] {
            (subscription.callback)(event, registry);
        }
    }
}

impl Default for PhaseDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter(u32);

    fn event() -> FrameEvent {
        FrameEvent {
            frame_number: 7,
            time_step: 0.02,
        }
    }

    #[test]
    fn subscribers_run_in_subscription_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = PhaseDispatcher::new();
        for label in ["a", "b", "c"] {
            let calls = Rc::clone(&calls);
            dispatcher.subscribe(FramePhase::Update, move |_, _| {
                calls.borrow_mut().push(label)
            });
        }

        let mut registry = SubsystemRegistry::new();
        dispatcher.dispatch(FramePhase::Update, &event(), &mut registry);
        assert_eq!(*calls.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn dispatch_only_reaches_the_requested_phase() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = PhaseDispatcher::new();
        for phase in FramePhase::ALL {
            let calls = Rc::clone(&calls);
            dispatcher.subscribe(phase, move |_, _| calls.borrow_mut().push(phase));
        }

        let mut registry = SubsystemRegistry::new();
        dispatcher.dispatch(FramePhase::PostUpdate, &event(), &mut registry);
        assert_eq!(*calls.borrow(), vec![FramePhase::PostUpdate]);
    }

    #[test]
    fn callbacks_receive_payload_and_registry() {
        let mut dispatcher = PhaseDispatcher::new();
        dispatcher.subscribe(FramePhase::BeginFrame, |event, registry| {
            if let Some(counter) = registry.get_mut::<Counter>() {
                counter.0 += event.frame_number;
            }
        });

        let mut registry = SubsystemRegistry::new();
        registry.register(Counter(1));
        dispatcher.dispatch(FramePhase::BeginFrame, &event(), &mut registry);
        assert_eq!(registry.get::<Counter>().unwrap().0, 8);
    }

    #[test]
    fn unsubscribe_removes_only_that_callback() {
        let calls = Rc::new(RefCell::new(0));
        let mut dispatcher = PhaseDispatcher::new();
        let first = {
            let calls = Rc::clone(&calls);
            dispatcher.subscribe(FramePhase::EndFrame, move |_, _| *calls.borrow_mut() += 1)
        };
        {
            let calls = Rc::clone(&calls);
            dispatcher.subscribe(FramePhase::EndFrame, move |_, _| *calls.borrow_mut() += 10);
        }

        assert!(dispatcher.unsubscribe(first));
        assert!(!dispatcher.unsubscribe(first));
        assert_eq!(dispatcher.subscriber_count(FramePhase::EndFrame), 1);

        let mut registry = SubsystemRegistry::new();
        dispatcher.dispatch(FramePhase::EndFrame, &event(), &mut registry);
        assert_eq!(*calls.borrow(), 10);
    }
}
