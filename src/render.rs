//! Projection renderers.
//!
//! Three pure functions turn a [`PreviewModel`] into markup:
//!
//! | Renderer | Used for | Memories |
//! |----------|----------|----------|
//! | [`render_full_preview`] | editor canvas | all visible, page layout |
//! | [`render_sidebar_preview`] | builder sidebar | first N, "+N more" indicator |
//! | [`render_public_page`] | anonymous QR-code visitors | all visible, full document |
//!
//! ## Layouts
//!
//! ```text
//! grid       ┌──┐┌──┐┌──┐   fixed column count, square tiles
//!            └──┘└──┘└──┘
//! timeline   [a]            one column, a connector between
//!             │             consecutive items (none after the last)
//!            [b]
//! carousel   [a][b][c] →    horizontal track of 3:4 cards
//! ```
//!
//! Every renderer reads colors from the model's palette, so the dark
//! background rule is applied identically everywhere.
//!
//! HTML is generated with [maud](https://maud.lambda.xyz/); all
//! interpolation is escaped.

use crate::memory::MediaKind;
use crate::preview::{MemoryView, PreviewModel, RenderOptions, truncate_chars};
use crate::settings::{Layout, Palette, Settings};
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/memorial.css");

/// CSS custom properties for one page.
pub fn theme_style(palette: &Palette, settings: &Settings) -> String {
    format!(
        "--color-bg: {}; --color-accent: {}; --color-text: {}; --color-text-secondary: {}; --font-family: {};",
        palette.background,
        palette.accent,
        palette.text,
        palette.text_secondary,
        settings.font_family.css_stack(),
    )
}

// ============================================================================
// Shared components
// ============================================================================

fn media(m: &MemoryView, alt: &str) -> Markup {
    html! {
        @match m.kind {
            MediaKind::Photo => {
                img src=(m.src) alt=(alt) loading="lazy";
            }
            MediaKind::Video => {
                video src=(m.src) poster=[m.thumbnail.as_deref()] controls preload="metadata" {}
            }
        }
    }
}

fn caption(m: &MemoryView) -> Markup {
    html! {
        @if !m.description.is_empty() || m.date_label.is_some() {
            figcaption {
                @if let Some(date) = &m.date_label {
                    time.memory-date { (date) }
                }
                @if !m.description.is_empty() {
                    p.memory-description { (m.description) }
                }
            }
        }
    }
}

fn render_grid(memories: &[MemoryView], columns: u32) -> Markup {
    html! {
        div.memory-grid style={ "grid-template-columns: repeat(" (columns) ", 1fr);" } {
            @for m in memories {
                figure.memory-tile.memory-pending[m.pending] data-id=(m.id) {
                    (media(m, &m.description))
                }
            }
        }
    }
}

fn render_timeline(memories: &[MemoryView]) -> Markup {
    html! {
        div.memory-timeline {
            @for (idx, m) in memories.iter().enumerate() {
                @if idx > 0 {
                    div.timeline-connector aria-hidden="true" {}
                }
                figure.timeline-item.memory-pending[m.pending] data-id=(m.id) {
                    (media(m, &m.description))
                    (caption(m))
                }
            }
        }
    }
}

fn render_carousel(memories: &[MemoryView]) -> Markup {
    html! {
        div.memory-carousel {
            @for m in memories {
                figure.carousel-card.memory-pending[m.pending] data-id=(m.id) {
                    (media(m, &m.description))
                    (caption(m))
                }
            }
        }
    }
}

/// Arrange memories according to the page layout.
pub fn render_memories(memories: &[MemoryView], layout: Layout, options: &RenderOptions) -> Markup {
    match layout {
        Layout::Grid => render_grid(memories, options.grid_columns),
        Layout::Timeline => render_timeline(memories),
        Layout::Carousel => render_carousel(memories),
    }
}

fn header(model: &PreviewModel) -> Markup {
    html! {
        @if let Some(cover) = &model.cover_photo {
            img.memorial-cover src=(cover) alt="";
        }
        header.memorial-header {
            @if let Some(photo) = &model.profile_photo {
                img.memorial-profile src=(photo) alt=(model.name);
            }
            h1.memorial-name { (model.name) }
            @if let Some(lifespan) = model.lifespan() {
                p.memorial-lifespan { (lifespan) }
            }
        }
    }
}

fn page_body(model: &PreviewModel, options: &RenderOptions) -> Markup {
    html! {
        (header(model))
        @if !model.bio.is_empty() {
            section.memorial-bio { (model.bio) }
        }
        @if !model.memories.is_empty() {
            section.memorial-memories data-layout=(model.settings.layout) {
                (render_memories(&model.memories, model.settings.layout, options))
            }
        }
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Editor canvas: the page as it will look, without document chrome.
pub fn render_full_preview(model: &PreviewModel, options: &RenderOptions) -> Markup {
    html! {
        div.memorial.memorial-preview style=(theme_style(&model.palette, &model.settings)) {
            (page_body(model, options))
        }
    }
}

/// Compact builder sidebar: clamped bio and at most
/// `sidebar_max_items` thumbnails.
pub fn render_sidebar_preview(model: &PreviewModel, options: &RenderOptions) -> Markup {
    let (shown, more) = model.capped_memories(options.sidebar_max_items);
    let bio = truncate_chars(&model.bio, options.sidebar_bio_chars);

    html! {
        aside.memorial.memorial-sidebar style=(theme_style(&model.palette, &model.settings)) {
            @if let Some(photo) = &model.profile_photo {
                img.memorial-profile src=(photo) alt=(model.name);
            }
            h2.memorial-name { (model.name) }
            @if let Some(lifespan) = model.lifespan() {
                p.memorial-lifespan { (lifespan) }
            }
            @if !bio.is_empty() {
                p.sidebar-bio { (bio) }
            }
            @if !shown.is_empty() {
                div.sidebar-grid {
                    @for m in shown {
                        img.sidebar-thumb.memory-pending[m.pending]
                            src=(m.thumbnail.as_deref().unwrap_or(&m.src))
                            alt=(m.description)
                            data-kind=(m.kind);
                    }
                }
            }
            @if more > 0 {
                p.sidebar-more { (model.language.more_label(more)) }
            }
        }
    }
}

fn base_document(title: &str, lang: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// The public page reached through the QR code link.
pub fn render_public_page(model: &PreviewModel, options: &RenderOptions) -> Markup {
    let content = html! {
        main.memorial.memorial-public style=(theme_style(&model.palette, &model.settings)) {
            (page_body(model, options))
            @if model.settings.allow_comments {
                section.memorial-comments id="comments" data-page=(model.page_id) {
                    h2 { (model.language.comments_heading()) }
                }
            }
            footer.memorial-footer {
                @if let Some(link) = &model.unique_link {
                    a href={ "/" (link) } { "/" (link) }
                }
            }
        }
    };

    base_document(&model.name, model.language.lang_tag(), CSS_STATIC, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{IdentityField, PageDraft};
    use crate::memory::{MediaSource, Memory};
    use crate::preview::Language;
    use crate::settings::SettingUpdate;
    use crate::template::TemplateId;
    use crate::test_helpers::{editor, photo, video};

    fn model_with(n: usize, layout: Layout) -> PreviewModel {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.set_identity_field(IdentityField::Name("Ayşe Öztürk".into()))
            .unwrap();
        ed.apply_setting(SettingUpdate::Layout(layout));
        for i in 0..n {
            ed.add_memory(photo(&format!("p{i}"), i as i64).with_description(format!("photo {i}")))
                .unwrap();
        }
        ed.to_preview_model(&RenderOptions::default())
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn grid_uses_configured_columns() {
        let model = model_with(4, Layout::Grid);
        let opts = RenderOptions {
            grid_columns: 4,
            ..RenderOptions::default()
        };
        let html = render_full_preview(&model, &opts).into_string();
        assert!(html.contains("repeat(4, 1fr)"));
        assert_eq!(count(&html, "memory-tile"), 4);
    }

    #[test]
    fn timeline_has_connectors_between_items_only() {
        let model = model_with(3, Layout::Timeline);
        let html = render_full_preview(&model, &RenderOptions::default()).into_string();
        assert_eq!(count(&html, "timeline-item"), 3);
        assert_eq!(count(&html, "timeline-connector"), 2);
    }

    #[test]
    fn timeline_single_item_has_no_connector() {
        let model = model_with(1, Layout::Timeline);
        let html = render_full_preview(&model, &RenderOptions::default()).into_string();
        assert_eq!(count(&html, "timeline-connector"), 0);
    }

    #[test]
    fn carousel_renders_cards() {
        let model = model_with(2, Layout::Carousel);
        let html = render_full_preview(&model, &RenderOptions::default()).into_string();
        assert!(html.contains("memory-carousel"));
        assert_eq!(count(&html, "carousel-card"), 2);
    }

    #[test]
    fn sidebar_caps_at_six_with_more_indicator() {
        let model = model_with(8, Layout::Grid);
        let html = render_sidebar_preview(&model, &RenderOptions::default()).into_string();
        assert_eq!(count(&html, "sidebar-thumb"), 6);
        assert!(html.contains("+2 daha"));
    }

    #[test]
    fn labels_follow_locale() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        for i in 0..8 {
            ed.add_memory(photo(&format!("p{i}"), i)).unwrap();
        }
        let en = RenderOptions {
            locale: Language::En,
            ..RenderOptions::default()
        };
        let model = ed.to_preview_model(&en);
        assert!(render_sidebar_preview(&model, &en).into_string().contains("+2 more"));
        let public = render_public_page(&model, &en).into_string();
        assert!(public.contains("<h2>Comments</h2>"));
        assert!(public.contains(r#"lang="en""#));

        let tr = RenderOptions::default();
        let public = render_public_page(&ed.to_preview_model(&tr), &tr).into_string();
        assert!(public.contains("<h2>Yorumlar</h2>"));
        assert!(!public.contains("Comments"));
    }

    #[test]
    fn sidebar_without_overflow_has_no_indicator() {
        let model = model_with(3, Layout::Grid);
        let html = render_sidebar_preview(&model, &RenderOptions::default()).into_string();
        assert_eq!(count(&html, "sidebar-thumb"), 3);
        assert!(!html.contains("sidebar-more"));
    }

    #[test]
    fn full_and_public_are_uncapped() {
        let model = model_with(8, Layout::Grid);
        let opts = RenderOptions::default();
        let full = render_full_preview(&model, &opts).into_string();
        let public = render_public_page(&model, &opts).into_string();
        // The public page inlines the stylesheet, so count class attributes
        assert_eq!(count(&full, r#"class="memory-tile"#), 8);
        assert_eq!(count(&public, r#"class="memory-tile"#), 8);
    }

    #[test]
    fn sidebar_clamps_bio() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.set_identity_field(IdentityField::Bio("a".repeat(200))).unwrap();
        let model = ed.to_preview_model(&RenderOptions::default());

        let sidebar = render_sidebar_preview(&model, &RenderOptions::default()).into_string();
        assert!(sidebar.contains(&format!("{}…", "a".repeat(120))));
        assert!(!sidebar.contains(&"a".repeat(121)));

        let full = render_full_preview(&model, &RenderOptions::default()).into_string();
        assert!(full.contains(&"a".repeat(200)));
    }

    #[test]
    fn all_renderers_agree_on_dark_text() {
        let ed = editor(PageDraft::from_template("pg", "u1", TemplateId::Elegant));
        let opts = RenderOptions::default();
        let model = ed.to_preview_model(&opts);

        for html in [
            render_full_preview(&model, &opts).into_string(),
            render_sidebar_preview(&model, &opts).into_string(),
            render_public_page(&model, &opts).into_string(),
        ] {
            assert!(html.contains("--color-text: #f5f5f7"));
            assert!(html.contains("--color-bg: #2c2c2e"));
        }
    }

    #[test]
    fn public_page_is_full_document() {
        let model = model_with(1, Layout::Grid);
        let html = render_public_page(&model, &RenderOptions::default()).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Ayşe Öztürk</title>"));
        assert!(html.contains(r#"lang="tr""#));
    }

    #[test]
    fn comments_follow_allow_comments() {
        let opts = RenderOptions::default();
        let with = model_with(1, Layout::Grid);
        assert!(render_public_page(&with, &opts).into_string().contains(r#"id="comments""#));

        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.apply_setting(SettingUpdate::AllowComments(false));
        let without = ed.to_preview_model(&opts);
        assert!(
            !render_public_page(&without, &opts)
                .into_string()
                .contains(r#"id="comments""#)
        );
    }

    #[test]
    fn video_renders_video_element() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.add_memory(video("v", 1, 1024).with_thumbnail("https://cdn.example/v.jpg"))
            .unwrap();
        let opts = RenderOptions::default();
        let html = render_full_preview(&ed.to_preview_model(&opts), &opts).into_string();
        assert!(html.contains("<video"));
        assert!(html.contains(r#"poster="https://cdn.example/v.jpg""#));
    }

    #[test]
    fn pending_items_are_marked() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.add_memory(Memory {
            source: MediaSource::pending(),
            ..photo("a", 1)
        })
        .unwrap();
        let opts = RenderOptions::default();
        let html = render_full_preview(&ed.to_preview_model(&opts), &opts).into_string();
        assert!(html.contains("memory-pending"));
        assert!(html.contains("local:"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let model = model_with(5, Layout::Timeline);
        let opts = RenderOptions::default();
        assert_eq!(
            render_public_page(&model, &opts).into_string(),
            render_public_page(&model, &opts).into_string()
        );
    }

    #[test]
    fn injected_colors_never_reach_the_style_attribute() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.apply_setting(SettingUpdate::BackgroundColor(
            "#fff; background-image:url(https://x)".into(),
        ));
        let opts = RenderOptions::default();
        let html = render_public_page(&ed.to_preview_model(&opts), &opts).into_string();
        assert!(!html.contains("https://x"));
        assert!(html.contains("--color-bg: #ffffff;"));
    }

    #[test]
    fn stored_draft_with_unchecked_colors_renders_defaults() {
        let mut doc = serde_json::to_value(PageDraft::new("pg", "u1")).unwrap();
        doc["settings"]["backgroundColor"] = " #2C2C2E ".into();
        doc["settings"]["accentColor"] = "red;color:red".into();
        let draft: PageDraft = serde_json::from_value(doc).unwrap();

        let opts = RenderOptions::default();
        let html = render_public_page(&editor(draft).to_preview_model(&opts), &opts).into_string();
        assert!(html.contains("--color-bg: #2c2c2e;"));
        assert!(html.contains("--color-accent: #007aff;"));
        assert!(html.contains("--color-text: #f5f5f7;"));
        assert!(!html.contains("red;color"));
    }

    #[test]
    fn content_is_escaped() {
        let mut ed = editor(PageDraft::new("pg", "u1"));
        ed.set_identity_field(IdentityField::Name("<script>alert('x')</script>".into()))
            .unwrap();
        let opts = RenderOptions::default();
        let html = render_public_page(&ed.to_preview_model(&opts), &opts).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
