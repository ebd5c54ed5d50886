use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x5B_8D_EF;

pub const SUCCESS_MARK: &str = "\u{2705}";
pub const WARNING_MARK: &str = "\u{26A0}\u{FE0F}";

/// One-line confirmation embed, e.g. "✅ Successfully infracted **user**."
pub fn success_embed(text: impl AsRef<str>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(format!("{SUCCESS_MARK} {}", text.as_ref()))
}

/// One-line refusal embed, e.g. "⚠️ You cannot infract yourself."
pub fn warning_embed(text: impl AsRef<str>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(format!("{WARNING_MARK} {}", text.as_ref()))
}

/// Titled embed with an optional thumbnail, the shape used by menus.
pub fn titled_embed(
    title: impl Into<String>,
    description: impl Into<String>,
    thumbnail: Option<&str>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(title)
        .description(description);

    match thumbnail {
        Some(url) => embed.thumbnail(url),
        None => embed,
    }
}

/// Build a page of a paginated listing.
pub fn build_paginated_embed(
    title: &str,
    description: impl Into<String>,
    page: usize,
    total_pages: usize,
    footer_note: Option<&str>,
) -> serenity::CreateEmbed {
    let builder = serenity::CreateEmbed::new()
        .title(title.to_owned())
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let footer_text = page_footer(page, total_pages, footer_note);
    if footer_text.is_empty() {
        builder
    } else {
        builder.footer(serenity::CreateEmbedFooter::new(footer_text))
    }
}

fn page_footer(page: usize, total_pages: usize, footer_note: Option<&str>) -> String {
    let page = page.max(1);
    let total_pages = total_pages.max(1);
    let note = footer_note.filter(|note| !note.is_empty());

    match (total_pages > 1, note) {
        (true, Some(note)) => format!("Page {}/{} \u{2022} {}", page, total_pages, note),
        (true, None) => format!("Page {}/{}", page, total_pages),
        (false, Some(note)) => note.to_owned(),
        (false, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::page_footer;

    #[test]
    fn footer_combines_page_and_note() {
        assert_eq!(page_footer(1, 3, None), "Page 1/3");
        assert_eq!(
            page_footer(2, 3, Some("Found 12 promotion(s).")),
            "Page 2/3 \u{2022} Found 12 promotion(s)."
        );
        assert_eq!(page_footer(1, 1, Some("Found 1 promotion(s).")), "Found 1 promotion(s).");
        assert_eq!(page_footer(1, 1, Some("")), "");
        assert_eq!(page_footer(0, 0, None), "");
    }
}
