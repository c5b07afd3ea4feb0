//! Local-vs-remote backend choice for a commit.

use std::sync::Arc;

use tracing::debug;

use mapnotes_core::{BackendKind, ConnectivityProbe, LayerSettings, NoteRecord};

/// Pick the backend for a commit on `note` (`None` for a brand-new note).
///
/// Local records always stay local; otherwise offline mode or missing
/// connectivity sends the commit to the local store. Connectivity is only
/// probed when the earlier checks did not decide.
pub fn select_backend(
    note: Option<&NoteRecord>,
    offline_editing: bool,
    connectivity: &dyn ConnectivityProbe,
) -> BackendKind {
    if note.is_some_and(|n| n.local) || offline_editing || !connectivity.is_online() {
        BackendKind::Local
    } else {
        BackendKind::Remote
    }
}

/// Backend selection bound to live settings and connectivity.
///
/// Nothing is cached: every call re-reads the settings and probes the
/// network.
#[derive(Clone)]
pub struct BackendSelector {
    settings: Arc<dyn LayerSettings>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl BackendSelector {
    pub fn new(settings: Arc<dyn LayerSettings>, connectivity: Arc<dyn ConnectivityProbe>) -> Self {
        Self {
            settings,
            connectivity,
        }
    }

    pub fn select(&self, note: Option<&NoteRecord>) -> BackendKind {
        let backend = select_backend(
            note,
            self.settings.offline_editing(),
            self.connectivity.as_ref(),
        );
        debug!(
            note_id = note.map(|n| n.id),
            backend = %backend,
            "Selected commit backend"
        );
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapnotes_core::LayerConfig;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Probe {
        online: AtomicBool,
        calls: AtomicUsize,
    }

    impl Probe {
        fn new(online: bool) -> Self {
            Self {
                online: AtomicBool::new(online),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ConnectivityProbe for Probe {
        fn is_online(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.online.load(Ordering::SeqCst)
        }
    }

    fn local_note() -> NoteRecord {
        NoteRecord {
            local: true,
            ..NoteRecord::new_at(0.0, 0.0)
        }
    }

    #[test]
    fn test_local_note_always_local() {
        let online = Probe::new(true);
        assert_eq!(select_backend(Some(&local_note()), false, &online), BackendKind::Local);
        assert_eq!(select_backend(Some(&local_note()), true, &online), BackendKind::Local);
        // Decided before the probe is consulted
        assert_eq!(online.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_offline_mode_selects_local() {
        let online = Probe::new(true);
        let note = NoteRecord::new_at(0.0, 0.0);
        assert_eq!(select_backend(Some(&note), true, &online), BackendKind::Local);
        assert_eq!(select_backend(None, true, &online), BackendKind::Local);
    }

    #[test]
    fn test_no_connectivity_selects_local() {
        let offline = Probe::new(false);
        let note = NoteRecord::new_at(0.0, 0.0);
        assert_eq!(select_backend(Some(&note), false, &offline), BackendKind::Local);
    }

    #[test]
    fn test_online_remote_note_selects_remote() {
        let online = Probe::new(true);
        let note = NoteRecord::new_at(0.0, 0.0);
        assert_eq!(select_backend(Some(&note), false, &online), BackendKind::Remote);
        assert_eq!(select_backend(None, false, &online), BackendKind::Remote);
    }

    #[test]
    fn test_selector_probes_on_every_call() {
        let probe = Arc::new(Probe::new(true));
        let selector = BackendSelector::new(Arc::new(LayerConfig::default()), probe.clone());

        assert_eq!(selector.select(None), BackendKind::Remote);
        probe.online.store(false, Ordering::SeqCst);
        assert_eq!(selector.select(None), BackendKind::Local);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    }
}
