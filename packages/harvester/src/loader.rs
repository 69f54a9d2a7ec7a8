//! The contract every site loader implements.

use std::fmt::Display;

use crate::error::Result;
use crate::link::Link;
use crate::sources::Source;
use crate::uri::hostname;

/// A configured harvester for one external source.
///
/// `url` and `get_links` validate the loader's configuration when they
/// run, never when a setter is called. Every call re-fetches from the
/// network. A loader is owned by one caller at a time.
pub trait Loader: Send {
    /// Which site this loader harvests.
    fn source(&self) -> Source;

    /// The page the loader currently targets.
    ///
    /// May probe the network to choose between URL templates.
    fn url(&self) -> Result<String>;

    /// Host component of [`Loader::url`].
    fn hostname(&self) -> Result<Option<String>> {
        Ok(hostname(&self.url()?))
    }

    /// Enumerate the documents currently published, keeping the warnings
    /// of rows that had to be skipped.
    fn harvest(&self) -> Result<Harvest<Link>>;

    /// Enumerate the documents currently published.
    fn get_links(&self) -> Result<Vec<Link>> {
        Ok(self.harvest()?.into_items())
    }
}

/// Items collected from a multi-row page, plus the rows that were skipped.
///
/// A row that fails to parse is logged and recorded as a warning; it never
/// aborts collection of the remaining rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

impl<T> Default for Harvest<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Harvest<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold per-row results, keeping successes and logging failures.
    ///
    /// `what` names the kind of row in warnings, e.g. "row" or "report".
    pub fn from_rows<I>(what: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = Result<T>>,
    {
        let mut harvest = Self::new();
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Ok(item) => harvest.push(item),
                Err(e) => harvest.skip(format!("{what} {index}"), e),
            }
        }
        harvest
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Record a skipped unit.
    pub fn skip(&mut self, context: impl Display, error: impl Display) {
        let message = format!("{context}: {error}");
        tracing::warn!(%message, "Skipping unparseable entry");
        self.warnings.push(message);
    }

    /// Append another harvest, keeping its warnings.
    pub fn merge(&mut self, other: Harvest<T>) {
        self.items.extend(other.items);
        self.warnings.extend(other.warnings);
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
