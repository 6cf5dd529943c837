//! Change notifications for the document.
//!
//! The engine emits exactly one [`SceneChange`] per committed command so that
//! views (layer panels, previews, scorers) can refresh without polling.

use serde::Serialize;

use crate::object::ObjectId;

/// What changed in a committed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SceneChange {
    /// An object was added.
    ObjectAdded {
        /// The new object.
        id: ObjectId,
    },
    /// An object was removed.
    ObjectRemoved {
        /// The removed object.
        id: ObjectId,
    },
    /// One or more objects changed in place.
    ObjectsChanged {
        /// The changed objects.
        ids: Vec<ObjectId>,
    },
    /// The render order changed.
    Reordered,
    /// The whole document was replaced (undo, redo, load, group, ungroup).
    DocumentReplaced,
    /// The document size changed.
    CanvasResized {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// The background colour changed.
    BackgroundChanged,
}

type Observer = Box<dyn FnMut(&SceneChange) + Send>;

/// Ordered list of change observers.
#[derive(Default)]
pub struct ChangeBus {
    observers: Vec<Observer>,
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("observers", &format!("<{} observers>", self.observers.len()))
            .finish()
    }
}

impl ChangeBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SceneChange) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Deliver a change to every observer.
    pub fn emit(&mut self, change: &SceneChange) {
        for observer in &mut self.observers {
            observer(change);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_reaches_all_observers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = ChangeBus::new();
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |change| {
                seen.lock().expect("lock").push((tag, change.clone()));
            });
        }

        bus.emit(&SceneChange::Reordered);
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "a");
        assert_eq!(seen[1].1, SceneChange::Reordered);
    }

    #[test]
    fn test_change_serializes_with_tag() {
        let json = serde_json::to_value(SceneChange::CanvasResized {
            width: 10,
            height: 20,
        })
        .expect("serialize");
        assert_eq!(json["type"], "canvasResized");
        assert_eq!(json["width"], 10);
    }
}
