//! # View
//!
//! Render-ready view of a [`Session`], for a UI shell to display.

use serde::{Deserialize, Serialize};

use crate::catalog::ProofCatalog;
use crate::channel::QrOptions;
use crate::config::Config;
use crate::listener::ConnectionStatus;
use crate::session::Session;

/// Page heading.
pub const TITLE: &str = "Verify with Echo ID";

/// Message shown when the envelope cannot be loaded.
pub const LOAD_ERROR: &str = "Failed to load auth request";

/// What the UI should display.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "view")]
pub enum ViewModel {
    /// The envelope is being fetched.
    Loading,

    /// Blocking error. No proof selection controls are shown.
    Error {
        /// Message for the user.
        message: String,
    },

    /// Proof selection controls and, once a proof is selected, its channels.
    Ready {
        /// Page heading.
        title: String,

        /// Proof types to choose from, in catalog order.
        options: Vec<ProofOption>,

        /// Channels for the selected proof type.
        #[serde(skip_serializing_if = "Option::is_none")]
        selection: Option<SelectionView>,

        /// Recoverable error from the last selection.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// A selectable proof type.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProofOption {
    /// Descriptor id to select.
    pub id: String,

    /// Button label.
    pub label: String,

    /// Whether this option is the active selection.
    pub selected: bool,
}

/// Channels of the active selection.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SelectionView {
    /// Id of the selection, echoed by completion signals.
    pub selection_id: String,

    /// Mobile wallet deep link.
    pub wallet_link: String,

    /// Payload to render as a QR code.
    pub qr_payload: String,

    /// How to render the QR code.
    pub qr: QrOptions,

    /// Whether the wallet has answered.
    pub connected: bool,
}

impl ViewModel {
    /// Build the view of `session`.
    #[must_use]
    pub fn new(session: &Session, catalog: &ProofCatalog, config: &Config) -> Self {
        match session {
            Session::Loading => Self::Loading,
            Session::Failed(_) => Self::Error {
                message: LOAD_ERROR.to_string(),
            },
            Session::Ready(_) => {
                let selection = session.selection();
                let options = catalog
                    .descriptors()
                    .iter()
                    .map(|d| ProofOption {
                        id: d.id.clone(),
                        label: d.label.clone(),
                        selected: selection.is_some_and(|s| s.proof == d.id),
                    })
                    .collect();

                Self::Ready {
                    title: TITLE.to_string(),
                    options,
                    selection: selection.map(|s| SelectionView {
                        selection_id: s.id.to_string(),
                        wallet_link: s.payload.wallet_link.clone(),
                        qr_payload: s.payload.qr_payload.clone(),
                        qr: config.qr,
                        connected: session.status() == ConnectionStatus::Connected,
                    }),
                    error: session.error().map(|e| e.description().to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    #[test]
    fn loading() {
        let view = ViewModel::new(&Session::Loading, &ProofCatalog::builtin(), &Config::default());
        assert_eq!(view, ViewModel::Loading);
    }

    #[test]
    fn blocking_error() {
        let session = Session::Loading.loaded(Err(Error::EnvelopeFetch("HTTP 500".to_string())));
        let view = ViewModel::new(&session, &ProofCatalog::builtin(), &Config::default());
        assert_eq!(
            view,
            ViewModel::Error {
                message: LOAD_ERROR.to_string()
            }
        );
    }

    #[test]
    fn options_before_selection() {
        let session = Session::Loading.loaded(Ok("{\"body\":{}}".parse().unwrap()));
        let ViewModel::Ready {
            options, selection, ..
        } = ViewModel::new(&session, &ProofCatalog::builtin(), &Config::default())
        else {
            panic!("should be ready");
        };

        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| !o.selected));
        assert!(selection.is_none());
    }
}
