//! Client side search: case-insensitive substring match, recomputed per call.

use crate::record::Stored;

pub trait Searchable {
    /// Text fields the free query is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn genre(&self) -> &str;
}

impl<R: Searchable> Searchable for Stored<R> {
    fn search_fields(&self) -> Vec<&str> {
        self.data.search_fields()
    }

    fn genre(&self) -> &str {
        self.data.genre()
    }
}

/// Genre facet. `All` lets everything through, `Only` needs an exact match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(String),
}

impl GenreFilter {
    pub fn matches(&self, genre: &str) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(wanted) => wanted == genre,
        }
    }
}

impl From<Option<String>> for GenreFilter {
    fn from(value: Option<String>) -> Self {
        value.map_or(GenreFilter::All, GenreFilter::Only)
    }
}

pub fn matches_query<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.to_lowercase();
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// Items matching `query`, in their original order.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    filter_by_genre(items, query, &GenreFilter::All)
}

pub fn filter_by_genre<'a, T: Searchable>(
    items: &'a [T],
    query: &str,
    genre: &GenreFilter,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_query(*item, query) && genre.matches(item.genre()))
        .collect()
}

/// `All` followed by every distinct genre, in first-seen order.
pub fn genre_options<T: Searchable>(items: &[T]) -> Vec<GenreFilter> {
    let mut options = vec![GenreFilter::All];
    for item in items {
        let genre = GenreFilter::Only(item.genre().to_string());
        if !options.contains(&genre) {
            options.push(genre);
        }
    }
    options
}
