//! Grid of recursively rendered panes

use super::{ContentRenderer, RenderMode, RenderOutcome, RenderedItem};
use crate::resources::ResourceBag;
use crate::surface::{GridTemplate, MosaicPane, Surface, SurfaceContent};
use easyplay_core::{MediaItem, MosaicLayout};
use futures_util::future::join_all;
use tracing::debug;

/// Grid tracks and named areas for a layout
pub fn grid_template(layout: MosaicLayout) -> GridTemplate {
    match layout {
        MosaicLayout::TwoVertical => GridTemplate {
            columns: "1fr 1fr",
            rows: "1fr",
            areas: None,
        },
        MosaicLayout::TwoHorizontal => GridTemplate {
            columns: "1fr",
            rows: "1fr 1fr",
            areas: None,
        },
        MosaicLayout::LargeLeftTwoSmall => GridTemplate {
            columns: "2fr 1fr",
            rows: "1fr 1fr",
            areas: Some("\"large small-top\" \"large small-bottom\""),
        },
        MosaicLayout::LargeRightTwoSmall => GridTemplate {
            columns: "1fr 2fr",
            rows: "1fr 1fr",
            areas: Some("\"small-top large\" \"small-bottom large\""),
        },
        MosaicLayout::ThreeVertical => GridTemplate {
            columns: "1fr 1fr 1fr",
            rows: "1fr",
            areas: None,
        },
        MosaicLayout::ThreeHorizontal => GridTemplate {
            columns: "1fr",
            rows: "1fr 1fr 1fr",
            areas: None,
        },
        MosaicLayout::OneTopTwoBottom => GridTemplate {
            columns: "1fr 1fr",
            rows: "2fr 1fr",
            areas: Some("\"top top\" \"bottom-left bottom-right\""),
        },
        MosaicLayout::Grid2x2 => GridTemplate {
            columns: "1fr 1fr",
            rows: "1fr 1fr",
            areas: None,
        },
    }
}

/// Named area of the pane at `index`, in playlist order
fn pane_area(layout: MosaicLayout, index: usize) -> Option<&'static str> {
    let areas: &[&'static str] = match layout {
        MosaicLayout::LargeLeftTwoSmall => &["large", "small-top", "small-bottom"],
        MosaicLayout::LargeRightTwoSmall => &["small-top", "small-bottom", "large"],
        MosaicLayout::OneTopTwoBottom => &["top", "bottom-left", "bottom-right"],
        _ => &[],
    };
    areas.get(index).copied()
}

impl ContentRenderer {
    pub(super) async fn render_mosaic(
        &self,
        layout: MosaicLayout,
        panes: &[Option<MediaItem>],
    ) -> RenderOutcome {
        let slots = panes.iter().take(layout.pane_count());
        let rendered = join_all(slots.map(|pane| async move {
            match pane {
                Some(item) => Some(self.render_as(item, RenderMode::Pane).await),
                None => None,
            }
        }))
        .await;

        let mut resources = ResourceBag::new();
        let panes = rendered
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                let surface = match outcome {
                    Some(
                        RenderOutcome::Ready(pane)
                        | RenderOutcome::Degraded { rendered: pane, .. },
                    ) => {
                        resources.adopt(pane.resources);
                        Some(pane.surface)
                    }
                    Some(RenderOutcome::Skip(reason)) => {
                        debug!(index, %reason, "Mosaic pane left empty");
                        None
                    }
                    None => None,
                };
                MosaicPane {
                    area: pane_area(layout, index),
                    surface,
                }
            })
            .collect();

        RenderOutcome::Ready(
            RenderedItem::timed(Surface::new(SurfaceContent::Mosaic {
                grid: grid_template(layout),
                panes,
            }))
            .with_resources(resources),
        )
    }
}
