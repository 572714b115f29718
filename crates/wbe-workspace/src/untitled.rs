//! In-memory untitled buffers.

use std::cell::Cell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

use async_trait::async_trait;
use indexmap::IndexMap;
use wbe_source::Resource;

use crate::error::EditorError;
use crate::input::SaveOptions;
use crate::services::UntitledModel;
use crate::services::UntitledModels;
use crate::services::UntitledOptions;

type Buffers = RefCell<IndexMap<Resource, Rc<UntitledBuffer>>>;

/// Registry of untitled buffers, named `Untitled-1`, `Untitled-2`, ...
#[derive(Default)]
pub struct UntitledBuffers {
    buffers: Rc<Buffers>,
}

impl UntitledBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: &Resource) -> Option<Rc<UntitledBuffer>> {
        self.buffers.borrow().get(resource).cloned()
    }

    pub fn len(&self) -> usize {
        self.buffers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.borrow().is_empty()
    }

    fn next_resource(&self) -> Result<Resource, EditorError> {
        let buffers = self.buffers.borrow();
        let mut counter = 1;
        loop {
            let resource = Resource::untitled(&format!("Untitled-{counter}"))?;
            if !buffers.contains_key(&resource) {
                return Ok(resource);
            }
            counter += 1;
        }
    }
}

impl UntitledModels for UntitledBuffers {
    fn create(&self, options: UntitledOptions) -> Result<Rc<dyn UntitledModel>, EditorError> {
        if let Some(existing) = options
            .untitled_resource
            .as_ref()
            .and_then(|resource| self.get(resource))
        {
            return Ok(existing);
        }

        let resource = match options.untitled_resource {
            Some(resource) => resource,
            None => self.next_resource()?,
        };
        let value = options.initial_value.unwrap_or_default();
        let buffer = Rc::new(UntitledBuffer {
            resource: resource.clone(),
            associated: options.associated_resource,
            mode: options.mode,
            encoding: options.encoding,
            dirty: Cell::new(!value.is_empty()),
            value: RefCell::new(value),
            registry: Rc::downgrade(&self.buffers),
        });
        tracing::debug!(resource = %resource, "created untitled buffer");
        self.buffers.borrow_mut().insert(resource, buffer.clone());
        Ok(buffer)
    }
}

pub struct UntitledBuffer {
    resource: Resource,
    associated: Option<Resource>,
    mode: Option<String>,
    encoding: Option<String>,
    value: RefCell<String>,
    dirty: Cell<bool>,
    registry: Weak<Buffers>,
}

impl UntitledBuffer {
    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.borrow_mut() = value.into();
        self.dirty.set(true);
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}

#[async_trait(?Send)]
impl UntitledModel for UntitledBuffer {
    fn resource(&self) -> Resource {
        self.resource.clone()
    }

    fn name(&self) -> String {
        match &self.associated {
            Some(associated) => associated.basename(),
            None => self.resource.basename(),
        }
    }

    fn associated_resource(&self) -> Option<Resource> {
        self.associated.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Saves to the associated resource. Without one there is nobody to ask
    /// for a target, so the save is cancelled.
    async fn save(&self, _options: &SaveOptions) -> Option<Resource> {
        let target = self.associated.clone()?;
        self.dirty.set(false);
        tracing::debug!(resource = %self.resource, target = %target, "saved untitled buffer");
        Some(target)
    }

    async fn revert(&self) -> bool {
        self.value.borrow_mut().clear();
        self.dirty.set(false);
        true
    }

    fn dispose(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry.borrow_mut().shift_remove(&self.resource);
            drop(removed);
        }
    }
}

impl fmt::Debug for UntitledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntitledBuffer")
            .field("resource", &self.resource)
            .field("associated", &self.associated)
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}
