mod sync_images;

pub use sync_images::*;
