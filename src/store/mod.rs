pub mod filter;
pub mod import;
pub mod storage;
pub mod types;

pub use filter::{compare_ranked, ClinicFilter};
pub use import::{read_clinic_records, read_signals};
pub use storage::{load_store, save_store};
pub use types::{ClinicRecord, ClinicStore, RatedIndices, UpsertOutcome, STORE_VERSION};
