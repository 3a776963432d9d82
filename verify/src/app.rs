//! # Verifier
//!
//! Drives a verification session from UI events and `proof-complete`
//! signals.
//!
//! The verifier runs on a single task. Each event produces a new
//! [`Session`] snapshot which is published whole, so observers never see a
//! selection whose status has not been reset or whose channels are partly
//! updated.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::instrument;

use crate::Result;
use crate::catalog::ProofCatalog;
use crate::client::fetch_envelope;
use crate::config::Config;
use crate::session::Session;
use crate::signal::{ProofComplete, RequestReady, Signals};
use crate::types::AuthEnvelope;
use crate::view::ViewModel;

/// Events that drive a session.
#[derive(Clone, Debug)]
pub enum Event {
    /// The envelope fetch finished.
    Loaded(Result<AuthEnvelope>),

    /// The user selected the proof type with this descriptor id.
    Select(String),

    /// The user asked to present the request to the browser extension.
    UseExtension,

    /// A wallet delivered a proof.
    ProofComplete(ProofComplete),
}

/// Verification session driver.
#[derive(Debug)]
pub struct Verifier {
    config: Config,
    catalog: ProofCatalog,
    signals: Signals,
    session: watch::Sender<Arc<Session>>,
}

impl Verifier {
    /// Create a verifier with a `Loading` session.
    #[must_use]
    pub fn new(config: Config, catalog: ProofCatalog, signals: Signals) -> Self {
        let (session, _) = watch::channel(Arc::new(Session::Loading));
        Self {
            config,
            catalog,
            signals,
            session,
        }
    }

    /// The current session snapshot.
    #[must_use]
    pub fn session(&self) -> Arc<Session> {
        self.session.borrow().clone()
    }

    /// Watch session snapshots as they are published.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<Session>> {
        self.session.subscribe()
    }

    /// The view of the current session.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        ViewModel::new(&self.session(), &self.catalog, &self.config)
    }

    /// The signal hub shared with external collaborators.
    #[must_use]
    pub const fn signals(&self) -> &Signals {
        &self.signals
    }

    /// The proof catalog offered to the user.
    #[must_use]
    pub const fn catalog(&self) -> &ProofCatalog {
        &self.catalog
    }

    /// Apply an event and publish the resulting snapshot.
    pub fn update(&self, event: Event) -> Arc<Session> {
        let current = self.session();

        let next = match event {
            Event::Loaded(result) => current.loaded(result),
            Event::Select(id) => {
                let Some(descriptor) = self.catalog.find(&id) else {
                    tracing::warn!(proof = %id, "unknown proof type");
                    return current;
                };
                current.select(descriptor, &self.config.wallet_url)
            }
            Event::UseExtension => {
                let Some(selection) = current.selection() else {
                    tracing::warn!("no proof type selected");
                    return current;
                };
                self.signals.request_ready(RequestReady {
                    selection_id: selection.id,
                    request: Arc::clone(&selection.payload.request),
                });
                return current;
            }
            Event::ProofComplete(signal) => {
                let next = current.complete(&signal);
                // a stale or repeated signal changes nothing worth publishing
                if next.status() == current.status() {
                    return current;
                }
                next
            }
        };

        let next = Arc::new(next);
        self.session.send_replace(Arc::clone(&next));
        next
    }

    /// Fetch the sign-in envelope and apply the result.
    ///
    /// A failed fetch leaves the session `Failed`; it is not retried.
    #[instrument(level = "debug", skip_all)]
    pub async fn load(&self, http: &reqwest::Client) -> Arc<Session> {
        let result = fetch_envelope(http, &self.config.backend_url).await;
        self.update(Event::Loaded(result))
    }

    /// Process UI events and `proof-complete` signals until the event
    /// channel closes.
    ///
    /// The `proof-complete` subscription lives for the duration of the call.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>) {
        let mut proof_complete = self.signals.subscribe_proof_complete();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.update(event);
                    }
                    None => break,
                },
                Some(signal) = proof_complete.recv() => {
                    self.update(Event::ProofComplete(signal));
                }
            }
        }

        proof_complete.unsubscribe();
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::listener::ConnectionStatus;

    fn verifier() -> Verifier {
        let verifier = Verifier::new(Config::default(), ProofCatalog::builtin(), Signals::new());
        verifier.update(Event::Loaded(Ok("{\"body\":{}}".parse().unwrap())));
        verifier
    }

    #[test]
    fn extension_gets_selected_request() {
        let verifier = verifier();
        let mut request_ready = verifier.signals().subscribe_request_ready();

        let session = verifier.update(Event::Select("membership".to_string()));
        verifier.update(Event::UseExtension);

        let signal = request_ready.try_recv().expect("should signal");
        let selection = session.selection().expect("should select");
        assert_eq!(signal.selection_id, selection.id);
        assert!(Arc::ptr_eq(&signal.request, &selection.payload.request));
    }

    #[test]
    fn extension_without_selection() {
        let verifier = verifier();
        let mut request_ready = verifier.signals().subscribe_request_ready();
        verifier.update(Event::UseExtension);
        assert!(request_ready.try_recv().is_none());
    }

    #[test]
    fn unknown_proof() {
        let verifier = verifier();
        let session = verifier.update(Event::Select("unknown".to_string()));
        assert!(session.selection().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn stale_signal_not_published() {
        let verifier = verifier();
        let abandoned = verifier.update(Event::Select("proof-of-life".to_string()));
        let abandoned = abandoned.selection().expect("should select").id;
        let active = verifier.update(Event::Select("membership".to_string()));

        let mut watch = verifier.watch();
        let session = verifier.update(Event::ProofComplete(ProofComplete::new(abandoned, json!({}))));
        assert!(Arc::ptr_eq(&session, &active));
        assert!(!watch.has_changed().expect("sender alive"));

        // the matching signal is published once
        let id = active.selection().expect("should select").id;
        verifier.update(Event::ProofComplete(ProofComplete::new(id, json!({}))));
        assert!(watch.has_changed().expect("sender alive"));
        watch.borrow_and_update();
        verifier.update(Event::ProofComplete(ProofComplete::new(id, json!({}))));
        assert!(!watch.has_changed().expect("sender alive"));
    }

    #[tokio::test]
    async fn run_until_closed() {
        let verifier = verifier();
        let signals = verifier.signals().clone();
        let mut watch = verifier.watch();
        let (tx, rx) = mpsc::channel(8);

        let driver = async {
            verifier.run(rx).await;
        };
        let script = async {
            tx.send(Event::Select("proof-of-life".to_string())).await.unwrap();
            watch.changed().await.unwrap();
            let selection_id = watch.borrow_and_update().selection().unwrap().id;

            signals.proof_complete(ProofComplete::new(selection_id, json!({"ok": true})));
            watch.changed().await.unwrap();
            assert_eq!(watch.borrow().status(), ConnectionStatus::Connected);
            drop(tx);
        };
        tokio::join!(driver, script);

        assert_eq!(verifier.session().status(), ConnectionStatus::Connected);
    }
}
