//! Cover images for preview cards and the detail overlay. Only local files
//! are read; remote URLs and unreadable files fall back to a placeholder.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use ratatui::layout::Rect;
use ratatui_image::Resize;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol as ImageProtocol;

const BACKDROP_SIGMA: f32 = 6.0;
const BACKDROP_THUMB_PX: u32 = 96;

#[derive(Default)]
pub(crate) struct CoverCache {
    images: HashMap<String, Option<Arc<DynamicImage>>>,
}

impl CoverCache {
    pub(crate) fn get(&mut self, source: &str) -> Option<Arc<DynamicImage>> {
        if let Some(cached) = self.images.get(source) {
            return cached.clone();
        }
        let loaded = load_local_image(source).map(Arc::new);
        self.images.insert(source.to_string(), loaded.clone());
        loaded
    }
}

pub(crate) fn is_local_source(source: &str) -> bool {
    let source = source.trim();
    !source.is_empty() && !source.contains("://")
}

fn load_local_image(source: &str) -> Option<DynamicImage> {
    if !is_local_source(source) {
        return None;
    }
    match image::open(Path::new(source.trim())) {
        Ok(img) => Some(img),
        Err(err) => {
            tracing::debug!(source, %err, "cover image unavailable");
            None
        }
    }
}

pub(crate) fn blurred(img: &DynamicImage) -> DynamicImage {
    img.thumbnail(BACKDROP_THUMB_PX, BACKDROP_THUMB_PX)
        .blur(BACKDROP_SIGMA)
}

type CardCoverKey = (String, Rect);

/// One protocol per card cover and on-screen rect. Sources that cannot be
/// loaded are remembered as `None` so the swatch is drawn without retrying.
#[derive(Default)]
pub(crate) struct CardCovers {
    protocols: HashMap<CardCoverKey, Option<ImageProtocol>>,
}

impl CardCovers {
    pub(crate) fn ensure(
        &mut self,
        cache: &mut CoverCache,
        picker: &Picker,
        source: &str,
        area: Rect,
    ) {
        let key = (source.to_string(), area);
        if self.protocols.contains_key(&key) {
            return;
        }
        let protocol = cache.get(source).and_then(|img| {
            picker
                .new_protocol(
                    (*img).clone(),
                    area,
                    Resize::Fit(Some(image::imageops::FilterType::Triangle)),
                )
                .map_err(|err| tracing::debug!(source, %err, "card cover protocol failed"))
                .ok()
        });
        self.protocols.insert(key, protocol);
    }

    pub(crate) fn get(&self, source: &str, area: Rect) -> Option<&ImageProtocol> {
        self.protocols
            .get(&(source.to_string(), area))
            .and_then(Option::as_ref)
    }

    /// Drops protocols for cards that are no longer on screen.
    pub(crate) fn retain_visible(&mut self, visible: &HashSet<CardCoverKey>) {
        self.protocols.retain(|key, _| visible.contains(key));
    }

    pub(crate) fn clear(&mut self) {
        self.protocols.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailImageKey {
    source: String,
    backdrop_area: Rect,
    cover_area: Rect,
}

/// Protocols for the open detail overlay, rebuilt only when the book or
/// the layout changes.
#[derive(Default)]
pub(crate) struct DetailImages {
    key: Option<DetailImageKey>,
    pub backdrop: Option<ImageProtocol>,
    pub cover: Option<ImageProtocol>,
}

impl DetailImages {
    pub(crate) fn ensure(
        &mut self,
        cache: &mut CoverCache,
        picker: &Picker,
        source: &str,
        backdrop_area: Rect,
        cover_area: Rect,
    ) {
        let key = DetailImageKey {
            source: source.to_string(),
            backdrop_area,
            cover_area,
        };
        if self.key.as_ref() == Some(&key) {
            return;
        }
        self.key = Some(key);
        self.backdrop = None;
        self.cover = None;

        let Some(img) = cache.get(source) else {
            return;
        };

        self.backdrop = picker
            .new_protocol(blurred(&img), backdrop_area, Resize::Fit(None))
            .map_err(|err| tracing::debug!(%err, "backdrop protocol failed"))
            .ok();
        self.cover = picker
            .new_protocol(
                (*img).clone(),
                cover_area,
                Resize::Fit(Some(image::imageops::FilterType::Triangle)),
            )
            .map_err(|err| tracing::debug!(%err, "cover protocol failed"))
            .ok();
    }

    pub(crate) fn clear(&mut self) {
        self.key = None;
        self.backdrop = None;
        self.cover = None;
    }
}
