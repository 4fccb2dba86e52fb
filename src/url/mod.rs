//! URL handling for visited-set keying and link classification
//!
//! Two concerns live here: the normalization used to deduplicate visited
//! URLs, and the same-site classification that partitions discovered links
//! into internal and external lists.

mod domain;
mod normalize;

pub use domain::{is_same_site, partition_links, site_host};
pub use normalize::normalize;
