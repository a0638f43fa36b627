// Clip catalog module - the ordered set of saved clips and their file naming

mod record;
mod store;

pub use record::{
    display_name_from_filename, generate_filename, renamed_filename, validate_display_name,
    ClipRecord, NAME_SEPARATOR,
};
pub use store::{CatalogError, ClipCatalog, RenameError};
