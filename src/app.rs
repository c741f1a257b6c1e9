use std::{io::Write, sync::Arc};

use log::{info, warn};
use thiserror::Error;

use crate::{
    album::{Album, AlbumForm},
    cli::{AlbumAction, Command, TrackAction},
    config::Settings,
    error::ServiceError,
    form::ValidationError,
    http::ApiClient,
    record::{Id, Resource, Stored},
    search::{self, GenreFilter},
    service::{AlbumService, ResourceService, TrackService},
    store::{AlbumCollection, Collection, TrackCollection},
    track::{Track, TrackForm},
    utils::{format_year, is_image_url, truncate},
};

const TITLE_WIDTH: usize = 50;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not load settings: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Backend failures can simply be tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Service(_))
    }
}

/// Wires settings, the http client and the per-entity collections to the
/// commands, and renders the result as text.
pub struct App {
    client: Arc<ApiClient>,
    default_cover: String,
}

impl App {
    pub fn new(settings: &Settings, client: ApiClient) -> Self {
        App {
            client: Arc::new(client),
            default_cover: settings.catalog.default_cover_url.clone(),
        }
    }

    pub fn run(&self, command: Command, out: &mut impl Write) -> Result<(), AppError> {
        match command {
            Command::Tracks { action } => self.tracks(action, out),
            Command::Albums { action } => self.albums(action, out),
        }
    }

    fn tracks(&self, action: TrackAction, out: &mut impl Write) -> Result<(), AppError> {
        let service = TrackService::new(Arc::clone(&self.client));

        match action {
            TrackAction::List { search: query } => {
                let tracks: TrackCollection = Collection::new(service);
                tracks.reload()?;
                let items = tracks.items();
                let shown = search::filter(&items, &query);
                for track in &shown {
                    writeln!(out, "{}", track_line(track))?;
                }
                writeln!(out, "{} of {} tracks", shown.len(), items.len())?;
            }
            TrackAction::Show { id } => {
                let track = service.get(&id)?;
                write_track(out, &track)?;
            }
            TrackAction::Add(fields) => {
                let mut form = TrackForm::default();
                fields.apply(&mut form);
                let payload = form.submit(&self.default_cover)?;
                self.check_cover(&payload.cover_url);

                let tracks = mount(service);
                let created = tracks.add(&payload)?;
                writeln!(out, "Added {}", created)?;
            }
            TrackAction::Edit { id, fields } => {
                let tracks = mount(service);
                let current = current_record(&tracks, &id)?;

                let mut form = TrackForm::from(&current.data);
                fields.apply(&mut form);
                let payload = form.submit(&self.default_cover)?;
                self.check_cover(&payload.cover_url);

                let updated = tracks.update(&id, &payload)?;
                writeln!(out, "Updated {}", updated)?;
            }
            TrackAction::Delete { id } => {
                let tracks = mount(service);
                let known = tracks.find(&id);
                tracks.delete(&id)?;
                match known {
                    Some(track) => writeln!(out, "Deleted {}", track)?,
                    None => writeln!(out, "Deleted track {}", id)?,
                }
            }
        }
        Ok(())
    }

    fn albums(&self, action: AlbumAction, out: &mut impl Write) -> Result<(), AppError> {
        let service = AlbumService::new(Arc::clone(&self.client));

        match action {
            AlbumAction::List {
                search: query,
                genre,
            } => {
                let albums: AlbumCollection = Collection::new(service);
                albums.reload()?;
                let items = albums.items();
                let genre = GenreFilter::from(genre);
                let shown = search::filter_by_genre(&items, &query, &genre);
                for album in &shown {
                    writeln!(out, "{}", album_line(album))?;
                }
                writeln!(out, "{} of {} albums", shown.len(), items.len())?;
            }
            AlbumAction::Genres => {
                let albums: AlbumCollection = Collection::new(service);
                albums.reload()?;
                for option in search::genre_options(&albums.items()) {
                    match option {
                        GenreFilter::All => writeln!(out, "(all)")?,
                        GenreFilter::Only(genre) => writeln!(out, "{}", genre)?,
                    }
                }
            }
            AlbumAction::Show { id } => {
                let album = service.get(&id)?;
                write_album(out, &album)?;
            }
            AlbumAction::Add(fields) => {
                let mut form = AlbumForm::default();
                fields.apply(&mut form);
                let payload = form.submit(&self.default_cover)?;
                self.check_cover(&payload.cover_url);

                let albums = mount(service);
                let created = albums.add(&payload)?;
                writeln!(out, "Added {}", created)?;
            }
            AlbumAction::Edit { id, fields } => {
                let albums = mount(service);
                let current = current_record(&albums, &id)?;

                let mut form = AlbumForm::from(&current.data);
                fields.apply(&mut form);
                let payload = form.submit(&self.default_cover)?;
                self.check_cover(&payload.cover_url);

                let updated = albums.update(&id, &payload)?;
                writeln!(out, "Updated {}", updated)?;
            }
            AlbumAction::Delete { id } => {
                let albums = mount(service);
                let known = albums.find(&id);
                albums.delete(&id)?;
                match known {
                    Some(album) => writeln!(out, "Deleted {}", album)?,
                    None => writeln!(out, "Deleted album {}", id)?,
                }
            }
        }
        Ok(())
    }

    fn check_cover(&self, url: &str) {
        if url != self.default_cover && !is_image_url(url) {
            warn!("Cover url does not look like an image: {}", url);
        }
    }
}

/// Load the collection before mutating it. A failed load does not block
/// the mutation.
fn mount<R: Resource>(service: ResourceService<R>) -> Collection<R> {
    let collection = Collection::mount(service);
    if let Some(message) = collection.error() {
        warn!("{}", message);
    }
    collection
}

/// The record being edited: taken from the loaded list, or fetched by id.
fn current_record<R: Resource>(
    collection: &Collection<R>,
    id: &Id,
) -> Result<Stored<R>, ServiceError> {
    match collection.find(id) {
        Some(record) => Ok(record),
        None => {
            info!("{} {} not in the loaded list, fetching it", R::SINGULAR, id);
            collection.service().get(id)
        }
    }
}

fn track_line(track: &Track) -> String {
    let mut line = format!(
        "[{}] {} - {}",
        track.id,
        track.artist,
        truncate(&track.title, TITLE_WIDTH)
    );
    match format_year(track.year).as_str() {
        "" => line.push_str(&format!(" ({})", track.album)),
        year => line.push_str(&format!(" ({}, {})", track.album, year)),
    }
    line.push_str(&format!(" [{}]", track.genre));
    line
}

fn album_line(album: &Album) -> String {
    let mut line = format!(
        "[{}] {} - {}",
        album.id,
        album.artist,
        truncate(&album.title, TITLE_WIDTH)
    );
    let year = format_year(album.year.unwrap_or_default());
    if !year.is_empty() {
        line.push_str(&format!(" ({})", year));
    }
    if !album.genre.is_empty() {
        line.push_str(&format!(" [{}]", album.genre));
    }
    if let Some(count) = album.track_count.filter(|n| *n > 0) {
        line.push_str(&format!(" {} tracks", count));
    }
    if !album.duration.is_empty() {
        line.push_str(&format!(" {}", album.duration));
    }
    line
}

fn write_track(out: &mut impl Write, track: &Track) -> std::io::Result<()> {
    writeln!(out, "id:     {}", track.id)?;
    writeln!(out, "title:  {}", track.title)?;
    writeln!(out, "artist: {}", track.artist)?;
    writeln!(out, "album:  {}", track.album)?;
    writeln!(out, "year:   {}", format_year(track.year))?;
    writeln!(out, "genre:  {}", track.genre)?;
    writeln!(out, "cover:  {}", track.cover_url)
}

fn write_album(out: &mut impl Write, album: &Album) -> std::io::Result<()> {
    writeln!(out, "id:       {}", album.id)?;
    writeln!(out, "title:    {}", album.title)?;
    writeln!(out, "artist:   {}", album.artist)?;
    writeln!(out, "year:     {}", format_year(album.year.unwrap_or_default()))?;
    writeln!(out, "genre:    {}", album.genre)?;
    writeln!(
        out,
        "tracks:   {}",
        album.track_count.map(|n| n.to_string()).unwrap_or_default()
    )?;
    writeln!(out, "duration: {}", album.duration)?;
    writeln!(out, "cover:    {}", album.cover_url)
}
