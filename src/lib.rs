//! Call-detail-record ingestion: pulls CDR tables out of HTML and Excel
//! exports, normalizes the column drift between export versions, repairs
//! known-bad timestamps, scopes rows to known extensions and classifies
//! each call. The report module aggregates the resulting dataset.

pub mod assemble;
pub mod directory;
pub mod error;
pub mod parser;
pub mod record;
pub mod report;
pub mod settings;

pub use assemble::{Analysis, BatchStatus};
pub use directory::ExtensionDirectory;
pub use error::{ArtifactError, ArtifactWarning, WarningKind};
pub use parser::{analyze, analyze_with_progress};
pub use record::{Artifact, CallCategory, CanonicalRecord};
