use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::{
    album::AlbumData,
    error::ServiceError,
    record::{Id, Resource, Stored},
    service::ResourceService,
    track::TrackData,
};

/// What a view renders: the list plus the loading flag and the last error.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<R> {
    pub items: Vec<Stored<R>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        CollectionState {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

struct Inner<R> {
    state: CollectionState<R>,
    /// Bumped by `reload` and `cancel`. A list is applied only if the
    /// generation it started under is still current.
    generation: u64,
    /// Bumped by `cancel` only. Mutations check this one, so a reload never
    /// throws away a write the backend has already accepted.
    epoch: u64,
    /// Patches applied while a reload is in flight. The reload's list may
    /// predate them, so they are replayed on top of it.
    journal: Vec<Patch<R>>,
}

/// A local change derived from a successful mutation.
#[derive(Debug, Clone)]
enum Patch<R> {
    Insert(Stored<R>),
    Replace(Stored<R>),
    Remove(Id),
}

impl<R: Clone> Patch<R> {
    /// Applying a patch twice, or to a list that already reflects it, is a
    /// no-op.
    fn apply(&self, items: &mut Vec<Stored<R>>) {
        match self {
            Patch::Insert(created) => {
                if !items.iter().any(|item| item.id == created.id) {
                    items.insert(0, created.clone());
                }
            }
            Patch::Replace(updated) => {
                if let Some(slot) = items.iter_mut().find(|item| item.id == updated.id) {
                    *slot = updated.clone();
                }
            }
            Patch::Remove(id) => items.retain(|item| item.id != *id),
        }
    }
}

/// In-memory view of one backend collection and the operations that keep it
/// in sync.
///
/// Every mutation patches the list from the server's own response: created
/// records are prepended, updated ones replaced in place, deleted ones
/// removed. The lock is never held across a network call.
pub struct Collection<R> {
    service: ResourceService<R>,
    inner: Mutex<Inner<R>>,
}

pub type TrackCollection = Collection<TrackData>;
pub type AlbumCollection = Collection<AlbumData>;

impl<R: Resource> Collection<R> {
    /// An empty collection that has not talked to the backend yet.
    pub fn new(service: ResourceService<R>) -> Self {
        Collection {
            service,
            inner: Mutex::new(Inner {
                state: CollectionState::default(),
                generation: 0,
                epoch: 0,
                journal: Vec::new(),
            }),
        }
    }

    /// Create the collection and load it once. A failed first load is kept
    /// in `error` like any other reload failure.
    pub fn mount(service: ResourceService<R>) -> Self {
        let collection = Collection::new(service);
        let _ = collection.reload();
        collection
    }

    pub fn service(&self) -> &ResourceService<R> {
        &self.service
    }

    pub fn state(&self) -> CollectionState<R> {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<Stored<R>> {
        self.lock().state.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().state.error.clone()
    }

    pub fn find(&self, id: &Id) -> Option<Stored<R>> {
        self.lock().state.items.iter().find(|item| item.id == *id).cloned()
    }

    /// Replace the list with the backend's. Supersedes any older reload still
    /// in flight. Mutations that finish meanwhile are replayed on the new
    /// list. The error is recorded in the state and also returned.
    pub fn reload(&self) -> Result<(), ServiceError> {
        let ticket = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state.loading = true;
            inner.state.error = None;
            inner.journal.clear();
            inner.generation
        };

        let result = self.service.list_all();

        let mut inner = self.lock();
        if inner.generation != ticket {
            debug!("Discarding stale {} list", R::PLURAL);
            return result.map(|_| ());
        }
        inner.state.loading = false;
        let journal = std::mem::take(&mut inner.journal);
        match result {
            Ok(mut items) => {
                debug!("Loaded {} {}", items.len(), R::PLURAL);
                for patch in &journal {
                    patch.apply(&mut items);
                }
                inner.state.items = items;
                Ok(())
            }
            Err(e) => {
                inner.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn add(&self, payload: &R) -> Result<Stored<R>, ServiceError> {
        let ticket = self.begin_mutation();
        let result = self.service.create(payload);
        self.finish(ticket, result, |created| Patch::Insert(created.clone()))
    }

    pub fn update(&self, id: &Id, payload: &R) -> Result<Stored<R>, ServiceError> {
        let ticket = self.begin_mutation();
        let result = self.service.update(id, payload);
        self.finish(ticket, result, |updated| Patch::Replace(updated.clone()))
    }

    pub fn delete(&self, id: &Id) -> Result<(), ServiceError> {
        let ticket = self.begin_mutation();
        let result = self.service.delete(id);
        self.finish(ticket, result, |_| Patch::Remove(id.clone()))
    }

    /// Drop interest in every request in flight; their responses will not
    /// touch the state.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.epoch += 1;
        inner.state.loading = false;
        inner.journal.clear();
    }

    fn begin_mutation(&self) -> u64 {
        let mut inner = self.lock();
        inner.state.error = None;
        inner.epoch
    }

    fn finish<T>(
        &self,
        ticket: u64,
        result: Result<T, ServiceError>,
        patch: impl FnOnce(&T) -> Patch<R>,
    ) -> Result<T, ServiceError> {
        let mut inner = self.lock();
        if inner.epoch != ticket {
            debug!("Discarding cancelled {} response", R::SINGULAR);
            return result;
        }
        match &result {
            Ok(value) => {
                let patch = patch(value);
                patch.apply(&mut inner.state.items);
                if inner.state.loading {
                    inner.journal.push(patch);
                }
            }
            Err(e) => inner.state.error = Some(e.to_string()),
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
