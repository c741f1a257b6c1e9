use std::{marker::PhantomData, sync::Arc};

use log::{error, info};

use crate::{
    album::AlbumData,
    error::{ServiceError, TransportError},
    http::ApiClient,
    record::{Id, Resource, Stored},
    track::TrackData,
};

/// REST calls for one backend collection. One attempt per call, no retries.
pub struct ResourceService<R> {
    client: Arc<ApiClient>,
    _resource: PhantomData<fn() -> R>,
}

pub type TrackService = ResourceService<TrackData>;
pub type AlbumService = ResourceService<AlbumData>;

impl<R: Resource> ResourceService<R> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        ResourceService {
            client,
            _resource: PhantomData,
        }
    }

    pub fn list_all(&self) -> Result<Vec<Stored<R>>, ServiceError> {
        self.client.get_json(R::ENDPOINT).map_err(|source| {
            log_failure("fetching", R::PLURAL, None, &source);
            ServiceError::Fetch {
                noun: R::PLURAL,
                source,
            }
        })
    }

    pub fn get(&self, id: &Id) -> Result<Stored<R>, ServiceError> {
        self.client.get_json(&item_path::<R>(id)).map_err(|source| {
            log_failure("fetching", R::SINGULAR, Some(id), &source);
            ServiceError::Get {
                noun: R::SINGULAR,
                source,
            }
        })
    }

    /// The payload type carries no id; the backend assigns one.
    pub fn create(&self, payload: &R) -> Result<Stored<R>, ServiceError> {
        let created: Stored<R> = self.client.post_json(R::ENDPOINT, payload).map_err(|source| {
            log_failure("creating", R::SINGULAR, None, &source);
            ServiceError::Create {
                noun: R::SINGULAR,
                source,
            }
        })?;
        info!("Created {} {}", R::SINGULAR, created.id);
        Ok(created)
    }

    /// Full replace of the record at `id`.
    pub fn update(&self, id: &Id, payload: &R) -> Result<Stored<R>, ServiceError> {
        let updated: Stored<R> = self
            .client
            .put_json(&item_path::<R>(id), payload)
            .map_err(|source| {
                log_failure("updating", R::SINGULAR, Some(id), &source);
                ServiceError::Update {
                    noun: R::SINGULAR,
                    source,
                }
            })?;
        info!("Updated {} {}", R::SINGULAR, updated.id);
        Ok(updated)
    }

    pub fn delete(&self, id: &Id) -> Result<(), ServiceError> {
        self.client.delete(&item_path::<R>(id)).map_err(|source| {
            log_failure("deleting", R::SINGULAR, Some(id), &source);
            ServiceError::Delete {
                noun: R::SINGULAR,
                source,
            }
        })?;
        info!("Deleted {} {}", R::SINGULAR, id);
        Ok(())
    }
}

fn item_path<R: Resource>(id: &Id) -> String {
    format!("{}/{}", R::ENDPOINT, id)
}

fn log_failure(action: &str, noun: &str, id: Option<&Id>, cause: &TransportError) {
    match id {
        Some(id) => error!("Error {} {} {}: {}", action, noun, id, cause),
        None => error!("Error {} {}: {}", action, noun, cause),
    }
}
