//! PDF first page and markdown

use super::{require_file, ContentRenderer, RenderOutcome, RenderedItem, SkipReason};
use crate::platform::BackendError;
use crate::surface::{MarkdownBlock, Raster, Span, Surface, SurfaceContent};
use easyplay_core::{BinaryHandle, MediaItem};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use tracing::{debug, warn};

impl ContentRenderer {
    pub(super) async fn render_pdf(&self, item: &MediaItem) -> RenderOutcome {
        let file = match require_file(item) {
            Ok(file) => file,
            Err(reason) => return RenderOutcome::Skip(reason),
        };

        match self.rasterize_first_page(file).await {
            Ok(raster) => {
                debug!(
                    name = %item.name,
                    width = raster.width,
                    height = raster.height,
                    "Rasterized document"
                );
                RenderOutcome::Ready(RenderedItem::timed(Surface::new(
                    SurfaceContent::Document { raster },
                )))
            }
            Err(e) => RenderOutcome::degraded(format!(
                "Could not load PDF: {}. Details: {}",
                item.name, e
            )),
        }
    }

    /// First page scaled to the configured raster width
    async fn rasterize_first_page(&self, file: &BinaryHandle) -> Result<Raster, BackendError> {
        let (width, _) = self.platform.assets.page_size(file, 1).await?;
        if !(width.is_finite() && width > 0.0) {
            return Err(BackendError::new(format!("invalid page width {width}")));
        }
        let scale = f64::from(self.config.document_raster_width) / width;
        self.platform.assets.rasterize_page(file, 1, scale).await
    }

    pub(super) async fn render_markdown(&self, item: &MediaItem) -> RenderOutcome {
        let file = match require_file(item) {
            Ok(file) => file,
            Err(reason) => return RenderOutcome::Skip(reason),
        };
        match self.platform.assets.read_text(file).await {
            Ok(source) => RenderOutcome::Ready(RenderedItem::timed(Surface::new(
                SurfaceContent::Markdown {
                    blocks: parse_markdown(&source),
                },
            ))),
            Err(e) => {
                warn!(name = %item.name, error = %e, "Failed to read markdown file");
                RenderOutcome::Skip(SkipReason::LoadFailed(e.to_string()))
            }
        }
    }
}

#[derive(Default)]
struct InlineState {
    spans: Vec<Span>,
    bold: usize,
    italic: usize,
}

impl InlineState {
    fn push_text(&mut self, text: &str) {
        let (bold, italic) = (self.bold > 0, self.italic > 0);
        match self.spans.last_mut() {
            Some(last) if last.bold == bold && last.italic == italic => last.text.push_str(text),
            _ => self.spans.push(Span {
                text: text.to_string(),
                bold,
                italic,
            }),
        }
    }

    fn take(&mut self) -> Vec<Span> {
        std::mem::take(&mut self.spans)
    }
}

/// Parse markdown into headings (levels 1-3), paragraphs and bullet lists
///
/// Deeper headings are shown as level 3. Code and other block kinds keep
/// their text as paragraphs.
pub fn parse_markdown(source: &str) -> Vec<MarkdownBlock> {
    let mut blocks = Vec::new();
    let mut inline = InlineState::default();
    let mut list: Option<Vec<Vec<Span>>> = None;
    let mut heading: Option<u8> = None;

    for event in Parser::new_ext(source, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as u8).min(3));
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = heading.take().unwrap_or(1);
                blocks.push(MarkdownBlock::Heading {
                    level,
                    spans: inline.take(),
                });
            }
            Event::Start(Tag::List(_)) => {
                list.get_or_insert_with(Vec::new);
            }
            Event::End(TagEnd::List(_)) => {
                if let Some(items) = list.take() {
                    blocks.push(MarkdownBlock::List(items));
                }
            }
            Event::End(TagEnd::Item) => {
                let spans = inline.take();
                if let Some(items) = list.as_mut() {
                    items.push(spans);
                }
            }
            Event::End(TagEnd::Paragraph | TagEnd::CodeBlock | TagEnd::BlockQuote(_)) => {
                if list.is_none() && !inline.spans.is_empty() {
                    blocks.push(MarkdownBlock::Paragraph(inline.take()));
                }
            }
            Event::Start(Tag::Strong) => inline.bold += 1,
            Event::End(TagEnd::Strong) => inline.bold = inline.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => inline.italic += 1,
            Event::End(TagEnd::Emphasis) => inline.italic = inline.italic.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => inline.push_text(&text),
            Event::SoftBreak | Event::HardBreak => inline.push_text("\n"),
            _ => {}
        }
    }

    if !inline.spans.is_empty() {
        blocks.push(MarkdownBlock::Paragraph(inline.take()));
    }
    blocks
}
