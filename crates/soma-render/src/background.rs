//! Background image lifecycle.
//!
//! Loading is asynchronous on every real surface, so each request gets a
//! [`LoadTicket`]. Only the ticket of the latest request may resolve the
//! slot; a late completion for a replaced reference is dropped.

use crate::export::ExportError;
use crate::paint::Backdrop;
use soma_core::BackgroundSource;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<I> {
    Unset,
    Loading,
    Loaded(I),
    Failed(String),
}

/// How the image element fetches a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// CORS request without credentials. Keeps the export surface readable
    /// when the remote host allows it.
    Anonymous,
    /// Ordinary image request. Always displays, but taints the export
    /// surface for remote hosts.
    Plain,
}

impl Fetch {
    pub fn first(source: &BackgroundSource) -> Self {
        if source.is_export_safe() {
            Fetch::Plain
        } else {
            Fetch::Anonymous
        }
    }

    /// The attempt to make after this one failed, if any.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Fetch::Anonymous => Some(Fetch::Plain),
            Fetch::Plain => None,
        }
    }
}

/// Proof that a load was requested for a particular reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct BackgroundSlot<I> {
    source: Option<BackgroundSource>,
    generation: u64,
    state: LoadState<I>,
}

impl<I> Default for BackgroundSlot<I> {
    fn default() -> Self {
        Self {
            source: None,
            generation: 0,
            state: LoadState::Unset,
        }
    }
}

impl<I> BackgroundSlot<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&BackgroundSource> {
        self.source.as_ref()
    }

    pub fn state(&self) -> &LoadState<I> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Point the slot at `source`. Returns a ticket when the caller must
    /// start a load; `None` when the reference is unchanged or cleared.
    pub fn request(&mut self, source: Option<BackgroundSource>) -> Option<LoadTicket> {
        if source == self.source {
            return None;
        }
        self.generation += 1;
        self.source = source;
        match &self.source {
            None => {
                log::debug!("background: cleared");
                self.state = LoadState::Unset;
                None
            }
            Some(src) => {
                log::debug!("background: loading generation {}", self.generation);
                log::trace!("background: source {}", src.as_str());
                self.state = LoadState::Loading;
                Some(LoadTicket(self.generation))
            }
        }
    }

    /// Complete the load identified by `ticket`. Returns `false` when the
    /// ticket is stale and the result was discarded.
    pub fn resolve(&mut self, ticket: LoadTicket, result: Result<I, String>) -> bool {
        if ticket.0 != self.generation {
            log::debug!(
                "background: dropping stale load {} (current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(image) => LoadState::Loaded(image),
            Err(reason) => {
                log::warn!("background: load failed, using brand fill: {reason}");
                LoadState::Failed(reason)
            }
        };
        true
    }

    /// Decide what to do after the `failed` attempt for `ticket` errored.
    /// Returns the next attempt while the slot keeps loading, or `None` when
    /// the ticket is stale or no fallback is left, in which case the caller
    /// resolves the failure.
    pub fn retry(&mut self, ticket: LoadTicket, failed: Fetch) -> Option<Fetch> {
        if ticket.0 != self.generation || !self.is_loading() {
            return None;
        }
        let next = failed.fallback()?;
        log::info!("background: {failed:?} fetch failed, retrying as {next:?}");
        Some(next)
    }

    /// What the preview should paint underneath the text.
    pub fn backdrop(&self) -> Backdrop<'_, I> {
        match &self.state {
            LoadState::Loaded(image) => Backdrop::Image(image),
            LoadState::Unset | LoadState::Loading | LoadState::Failed(_) => Backdrop::Brand,
        }
    }

    /// Like [`Self::backdrop`], but refuses to export while a load is in
    /// flight so the output never silently drops the chosen image.
    pub fn export_backdrop(&self) -> Result<Backdrop<'_, I>, ExportError> {
        match self.state {
            LoadState::Loading => Err(ExportError::BackgroundPending),
            _ => Ok(self.backdrop()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remote(url: &str) -> Option<BackgroundSource> {
        BackgroundSource::parse(url)
    }

    #[test]
    fn load_then_resolve() {
        let mut slot = BackgroundSlot::<&str>::new();
        let ticket = slot.request(remote("https://example.com/a.png")).unwrap();
        assert!(slot.is_loading());
        assert!(matches!(slot.backdrop(), Backdrop::Brand));
        assert!(slot.resolve(ticket, Ok("a")));
        assert!(matches!(slot.backdrop(), Backdrop::Image(&"a")));
    }

    #[test]
    fn same_source_does_not_reload() {
        let mut slot = BackgroundSlot::<&str>::new();
        let _ = slot.request(remote("https://example.com/a.png"));
        assert_eq!(slot.request(remote("https://example.com/a.png")), None);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut slot = BackgroundSlot::<&str>::new();
        let first = slot.request(remote("https://example.com/a.png")).unwrap();
        let second = slot.request(remote("https://example.com/b.png")).unwrap();
        assert!(!slot.resolve(first, Ok("a")));
        assert!(slot.is_loading());
        assert!(slot.resolve(second, Ok("b")));
        assert_eq!(slot.state(), &LoadState::Loaded("b"));
    }

    #[test]
    fn failure_falls_back_to_brand() {
        let mut slot = BackgroundSlot::<&str>::new();
        let ticket = slot.request(remote("https://example.com/404.png")).unwrap();
        assert_eq!(
            slot.export_backdrop().err(),
            Some(ExportError::BackgroundPending)
        );
        slot.resolve(ticket, Err("404".into()));
        assert!(matches!(slot.backdrop(), Backdrop::Brand));
        assert!(slot.export_backdrop().is_ok());
    }

    #[test]
    fn remote_without_cors_falls_back_to_plain_fetch() {
        let mut slot = BackgroundSlot::<&str>::new();
        let source = remote("https://example.com/no-cors.png");
        let first = Fetch::first(source.as_ref().unwrap());
        assert_eq!(first, Fetch::Anonymous);
        let ticket = slot.request(source).unwrap();

        assert_eq!(slot.retry(ticket, first), Some(Fetch::Plain));
        assert!(slot.is_loading());
        assert!(slot.resolve(ticket, Ok("a")));
        assert!(matches!(slot.backdrop(), Backdrop::Image(&"a")));
    }

    #[test]
    fn plain_fetch_failure_is_final() {
        let mut slot = BackgroundSlot::<&str>::new();
        let source = BackgroundSource::parse("data:image/png;base64,AAAA");
        assert_eq!(Fetch::first(source.as_ref().unwrap()), Fetch::Plain);
        let ticket = slot.request(source).unwrap();
        assert_eq!(slot.retry(ticket, Fetch::Plain), None);

        let stale = slot.request(remote("https://example.com/a.png")).unwrap();
        let _ = slot.request(remote("https://example.com/b.png"));
        assert_eq!(slot.retry(stale, Fetch::Anonymous), None);
        assert_eq!(slot.retry(ticket, Fetch::Anonymous), None);
    }

    #[test]
    fn clearing_returns_to_unset() {
        let mut slot = BackgroundSlot::<&str>::new();
        let ticket = slot.request(remote("https://example.com/a.png")).unwrap();
        assert_eq!(slot.request(None), None);
        assert_eq!(slot.state(), &LoadState::Unset);
        assert!(!slot.resolve(ticket, Ok("a")));
    }
}
