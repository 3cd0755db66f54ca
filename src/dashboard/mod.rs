//! Dashboard operations behind the login: automation jobs, the building-code
//! PDF library, the per-floor path wizard, and the Speckle model viewer.
//!
//! Everything here goes through [`BackendClient`](crate::client::BackendClient),
//! so bearer propagation and error normalization apply uniformly.

mod automation;
mod viewer;
mod wizard;

pub use automation::{Automation, PdfUpload, UploadOutcome};
pub use viewer::{LoadedModel, ModelRef, ModelViewer, parse_model_url};
pub use wizard::{FloorWizard, UserInputs, WizardStep, parse_ids};
