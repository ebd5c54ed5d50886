use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::embed::build_paginated_embed;

pub const PAGINATION_TIMEOUT_SECS: u64 = 60 * 3;

/// Group entries into pages of at most `per_page` entries, blank-line separated.
pub fn chunk_pages(entries: &[String], per_page: usize) -> Vec<String> {
    entries
        .chunks(per_page.max(1))
        .map(|chunk| chunk.join("\n\n"))
        .collect()
}

fn pagination_components(
    prev_id: &str,
    next_id: &str,
    current_page: usize,
    total_pages: usize,
) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(prev_id)
            .label("Prev")
            .disabled(current_page == 0)
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new(next_id)
            .label("Next")
            .disabled(current_page + 1 >= total_pages)
            .style(serenity::ButtonStyle::Secondary),
    ])]
}

/// Send `pages` as one ephemeral embed with Prev/Next buttons.
///
/// The buttons are removed once nobody has pressed them for
/// [`PAGINATION_TIMEOUT_SECS`].
pub async fn paginate_embed_pages<U, E>(
    ctx: poise::Context<'_, U, E>,
    title: &str,
    pages: &[String],
    footer_note: Option<&str>,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if pages.is_empty() {
        return Ok(());
    }

    let total_pages = pages.len();
    let mut current_page = 0_usize;
    let page_embed = |page: usize| {
        build_paginated_embed(title, pages[page].clone(), page + 1, total_pages, footer_note)
    };

    if total_pages == 1 {
        ctx.send(
            poise::CreateReply::default()
                .embed(page_embed(0))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let ctx_id = ctx.id();
    let prev_button_id = format!("{ctx_id}_prev");
    let next_button_id = format!("{ctx_id}_next");

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(page_embed(current_page))
                .components(pagination_components(
                    &prev_button_id,
                    &next_button_id,
                    current_page,
                    total_pages,
                ))
                .ephemeral(true),
        )
        .await?;

    while let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
        .filter({
            let prefix = ctx_id.to_string();
            let author_id = ctx.author().id;
            move |interaction| {
                interaction.data.custom_id.starts_with(&prefix) && interaction.user.id == author_id
            }
        })
        .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
        .await
    {
        if press.data.custom_id == next_button_id {
            current_page = (current_page + 1).min(total_pages - 1);
        } else if press.data.custom_id == prev_button_id {
            current_page = current_page.saturating_sub(1);
        } else {
            continue;
        }

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .embed(page_embed(current_page))
                        .components(pagination_components(
                            &prev_button_id,
                            &next_button_id,
                            current_page,
                            total_pages,
                        )),
                ),
            )
            .await?;
    }

    let _ = reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .embed(page_embed(current_page))
                .components(Vec::new()),
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::chunk_pages;

    #[test]
    fn chunks_entries_into_pages() {
        let entries: Vec<String> = (1..=7).map(|n| format!("entry {n}")).collect();
        let pages = chunk_pages(&entries, 3);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "entry 1\n\nentry 2\n\nentry 3");
        assert_eq!(pages[2], "entry 7");
        assert!(chunk_pages(&[], 5).is_empty());
        assert_eq!(chunk_pages(&entries, 0).len(), 7);
    }
}
