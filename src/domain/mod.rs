mod labels;
mod load;
mod snapshot;

pub use labels::{CATEGORY_PALETTE, category_color, relationship_label, tag_color};
pub use load::load_snapshot;
pub use snapshot::Snapshot;
#[cfg(test)]
pub use snapshot::{Entity, Link, Relationship};
