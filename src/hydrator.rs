//! Image-URL hydration
//!
//! Scans whose documents only recorded an object-store path get a display
//! URL attached before they are handed to callers. Resolution failures are
//! soft: a missing thumbnail must not block the rest of the page.

use futures::future::join_all;

use crate::domain::scan::Scan;
use crate::infrastructure::store::{ImageStore, StoreError};

/// Resolve display URLs for a whole page.
///
/// Resolutions fan out concurrently and the page returns once all have
/// settled, so latency is bounded by the slowest single resolution. Order
/// of the scans is preserved.
pub async fn hydrate_page<I: ImageStore>(images: &I, scans: Vec<Scan>) -> Vec<Scan> {
    join_all(scans.into_iter().map(|scan| hydrate(images, scan))).await
}

/// Attach a display URL to one scan, if it needs one and the object store
/// can provide it.
pub async fn hydrate<I: ImageStore>(images: &I, mut scan: Scan) -> Scan {
    if !scan.needs_image_url() {
        return scan;
    }
    let Some(path) = scan.storage_path.clone() else {
        return scan;
    };
    match images.resolve_download_url(&path).await {
        Ok(url) => scan.image_url = Some(url),
        Err(StoreError::NotFound) => {
            tracing::debug!(storage_path = %path, "image object gone; rendering without thumbnail");
        }
        Err(err) => {
            tracing::warn!(storage_path = %path, error = %err, "image url resolution failed");
        }
    }
    scan
}
