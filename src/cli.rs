// Clap definitions in derive style

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{album::AlbumForm, record::Id, track::TrackForm};

#[derive(Parser, Debug)]
#[command(name = "discoteca", version, about)]
pub struct Cli {
    /// Increase verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base url, wins over the config file and environment
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage tracks
    Tracks {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Manage albums
    Albums {
        #[command(subcommand)]
        action: AlbumAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrackAction {
    /// List tracks, optionally filtered by title, artist, album or genre
    List {
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show a single track
    Show { id: Id },

    /// Add a new track
    Add(TrackArgs),

    /// Edit a track; fields not given keep their current value
    Edit {
        id: Id,
        #[command(flatten)]
        fields: TrackArgs,
    },

    /// Delete a track
    Delete { id: Id },
}

#[derive(Subcommand, Debug)]
pub enum AlbumAction {
    /// List albums, optionally filtered by title or artist and genre
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only albums of exactly this genre
        #[arg(short, long)]
        genre: Option<String>,
    },

    /// List the genres present in the catalog
    Genres,

    /// Show a single album
    Show { id: Id },

    /// Add a new album
    Add(AlbumArgs),

    /// Edit an album; fields not given keep their current value
    Edit {
        id: Id,
        #[command(flatten)]
        fields: AlbumArgs,
    },

    /// Delete an album
    Delete { id: Id },
}

/// Track fields. Everything is optional here; the form decides what is
/// missing.
#[derive(Args, Debug, Default)]
pub struct TrackArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub album: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    /// Cover image url; the default cover is used when empty
    #[arg(long)]
    pub cover: Option<String>,
}

impl TrackArgs {
    pub fn apply(self, form: &mut TrackForm) {
        overwrite(&mut form.title, self.title);
        overwrite(&mut form.artist, self.artist);
        overwrite(&mut form.album, self.album);
        overwrite(&mut form.year, self.year);
        overwrite(&mut form.genre, self.genre);
        overwrite(&mut form.cover_url, self.cover);
    }
}

#[derive(Args, Debug, Default)]
pub struct AlbumArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    /// Cover image url; the default cover is used when empty
    #[arg(long)]
    pub cover: Option<String>,
    /// Number of tracks
    #[arg(long)]
    pub tracks: Option<String>,
    /// Total length as mm:ss or hh:mm:ss
    #[arg(long)]
    pub duration: Option<String>,
}

impl AlbumArgs {
    pub fn apply(self, form: &mut AlbumForm) {
        overwrite(&mut form.title, self.title);
        overwrite(&mut form.artist, self.artist);
        overwrite(&mut form.year, self.year);
        overwrite(&mut form.genre, self.genre);
        overwrite(&mut form.cover_url, self.cover);
        overwrite(&mut form.track_count, self.tracks);
        overwrite(&mut form.duration, self.duration);
    }
}

fn overwrite(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}
