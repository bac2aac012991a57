
//! Filtering, ordering and paging parameters for collection queries.

use super::records::Gender;

use chrono::{DateTime, Utc};

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

/// Columns a game listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOrderField {
  Name,
  ReleaseDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOrdering {
  pub field: GameOrderField,
  pub direction: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct GameCategoryFilter {
  pub name: Option<String>,
  /// Case-insensitive name prefix.
  pub search: Option<String>,
  /// Categories can only be ordered by name.
  pub ordering: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct GameFilter {
  pub name: Option<String>,
  /// Exact category name.
  pub game_category: Option<String>,
  pub release_date: Option<DateTime<Utc>>,
  pub played: Option<bool>,
  /// Exact owner username.
  pub owner: Option<String>,
  /// Case-insensitive name prefix.
  pub search: Option<String>,
  /// Sort keys, most significant first. Empty means by name.
  pub ordering: Vec<GameOrdering>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
  pub name: Option<String>,
  pub gender: Option<Gender>,
  /// Case-insensitive name prefix.
  pub search: Option<String>,
  pub ordering: Direction,
}

/// A window into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub limit: i64,
  pub offset: i64,
}

/// One page of a collection, along with the size of the whole
/// (filtered) collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub count: i64,
  pub items: Vec<T>,
}

impl Direction {
  /// Parses a single ordering term such as `name` or `-name`,
  /// returning the bare field name and its direction.
  pub fn split_term(term: &str) -> (&str, Direction) {
    match term.strip_prefix('-') {
      Some(field) => (field, Direction::Descending),
      None => (term, Direction::Ascending),
    }
  }

  /// Reads the direction of the first term naming `field` in a
  /// comma-separated ordering list. Unknown fields are ignored.
  pub fn for_field(ordering: &str, field: &str) -> Direction {
    ordering
      .split(',')
      .map(|term| Direction::split_term(term.trim()))
      .find(|(name, _)| *name == field)
      .map(|(_, direction)| direction)
      .unwrap_or_default()
  }
}

impl FromStr for GameOrderField {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "name" => Ok(GameOrderField::Name),
      "release_date" => Ok(GameOrderField::ReleaseDate),
      _ => Err(()),
    }
  }
}

impl GameOrdering {
  /// Parses a comma-separated ordering list, dropping terms that do
  /// not name an orderable column.
  pub fn parse_list(ordering: &str) -> Vec<GameOrdering> {
    ordering
      .split(',')
      .filter_map(|term| {
        let (field, direction) = Direction::split_term(term.trim());
        let field = field.parse().ok()?;
        Some(GameOrdering { field, direction })
      })
      .collect()
  }
}

impl<T> Page<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      count: self.count,
      items: self.items.into_iter().map(f).collect(),
    }
  }
}

/// Escapes `LIKE` wildcards so that user input is matched literally.
pub fn escape_like(input: &str) -> String {
  let mut escaped = String::with_capacity(input.len());
  for c in input.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

/// Case-insensitive prefix match, used by the in-memory backend.
pub fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
  name.to_lowercase().starts_with(&prefix.to_lowercase())
}
