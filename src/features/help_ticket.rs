// Help tickets: a persistent button opens a modal, the modal opens a
// private channel visible to the requester and the helper role

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::store::StoreError;
use crate::utils::template::render;
use crate::{Data, Error};

pub const HELP_BUTTON_ID: &str = "help_button";
pub const HELP_MODAL_ID: &str = "help_modal";
const HELP_REASON_ID: &str = "help_reason";

pub async fn interaction_create(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::Interaction,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component)
            if component.data.custom_id == HELP_BUTTON_ID =>
        {
            open_modal(ctx, data, component).await
        }
        serenity::Interaction::Modal(modal) if modal.data.custom_id == HELP_MODAL_ID => {
            open_ticket(ctx, data, modal).await
        }
        _ => Ok(()),
    }
}

/// The ticket embed + button posted by `/add_help_channel`
pub fn ticket_prompt(
    data: &Data,
    language: crate::models::guild::Language,
) -> serenity::CreateMessage {
    let embed = serenity::CreateEmbed::new()
        .title("Help ticket")
        .description(
            data.langs
                .message(language, "help_ticket_description")
                .to_string(),
        )
        .color(crate::utils::config::colors::SUCCESS)
        .footer(serenity::CreateEmbedFooter::new("TyrBot - 🎫 Help"));
    let button = serenity::CreateButton::new(HELP_BUTTON_ID)
        .label("🎫")
        .style(serenity::ButtonStyle::Success);

    serenity::CreateMessage::new()
        .embed(embed)
        .components(vec![serenity::CreateActionRow::Buttons(vec![button])])
}

async fn open_modal(
    ctx: &serenity::Context,
    data: &Data,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };
    let config = match data.store.load(guild_id.get()).await {
        Ok(config) => config,
        Err(StoreError::NotFound(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let language = config.language;

    let input = serenity::CreateInputText::new(
        serenity::InputTextStyle::Paragraph,
        data.langs.message(language, "help_ticket_label").to_string(),
        HELP_REASON_ID,
    )
    .placeholder(
        data.langs
            .message(language, "help_ticket_placeholder")
            .to_string(),
    )
    .required(true);

    let modal = serenity::CreateModal::new(
        HELP_MODAL_ID,
        data.langs.message(language, "help_ticket_title").to_string(),
    )
    .components(vec![serenity::CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

async fn open_ticket(
    ctx: &serenity::Context,
    data: &Data,
    modal: &serenity::ModalInteraction,
) -> Result<(), Error> {
    let Some(guild_id) = modal.guild_id else {
        return Ok(());
    };
    let config = match data.store.load(guild_id.get()).await {
        Ok(config) => config,
        Err(StoreError::NotFound(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let language = config.language;

    let Some(reason) = submitted_reason(modal) else {
        return Ok(());
    };
    // which helper role owns tickets opened from this channel
    let Some(role_id) = config
        .help_system
        .channels_id
        .get(&modal.channel_id.to_string())
        .and_then(|id| id.parse::<u64>().ok())
    else {
        warn!(
            "help modal submitted in unconfigured channel {} of guild {}",
            modal.channel_id, guild_id
        );
        return Ok(());
    };

    let user = &modal.user;
    let vars = HashMap::from([("member", user.name.as_str())]);
    let name = render(&config.help_system.help_channel_name_template, &vars)
        .unwrap_or_else(|_| format!("help-{}", user.name));

    // hidden from everyone except the requester; the helper role pinged
    // below sees it through its own guild-level permissions
    let overwrites = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
        },
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::VIEW_CHANNEL,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(user.id),
        },
    ];

    let mut builder = serenity::CreateChannel::new(name)
        .kind(serenity::ChannelType::Text)
        .permissions(overwrites);
    if let Some(category) = config
        .help_system
        .help_category_id
        .as_deref()
        .and_then(|id| id.parse::<u64>().ok())
    {
        builder = builder.category(serenity::ChannelId::new(category));
    }
    let channel = guild_id.create_channel(&ctx.http, builder).await?;

    let mention = format!("<@{}>", user.id.get());
    let vars = HashMap::from([("member", mention.as_str()), ("help_reason", reason.as_str())]);
    let ticket_message = render(
        data.langs.message(language, "help_ticket_message"),
        &vars,
    )
    .unwrap_or_else(|_| format!("{mention}: {reason}"));

    channel
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new().content(format!("<@&{role_id}>")),
        )
        .await?;
    channel
        .send_message(&ctx.http, serenity::CreateMessage::new().content(ticket_message))
        .await?;

    let confirmation = render(
        data.langs.message(language, "help_ticket_opened"),
        &HashMap::from([("channel", format!("<#{}>", channel.id.get()).as_str())]),
    )
    .unwrap_or_else(|_| format!("<#{}>", channel.id.get()));
    modal
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(confirmation)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

fn submitted_reason(modal: &serenity::ModalInteraction) -> Option<String> {
    for row in &modal.data.components {
        for component in &row.components {
            if let serenity::ActionRowComponent::InputText(input) = component {
                if input.custom_id == HELP_REASON_ID {
                    return input.value.clone().filter(|value| !value.is_empty());
                }
            }
        }
    }
    None
}
