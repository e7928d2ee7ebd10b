// Help, ping and qr commands

use image::ImageEncoder;
use poise::serenity_prelude as serenity;

use crate::commands::{guild_language, say_key};
use crate::utils::config::colors;
use crate::{Context, Error};

/// Displays help about how to use the bot
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let language = guild_language(&ctx).await;

    let mut embed = serenity::CreateEmbed::new()
        .title("Help")
        .color(colors::PRIMARY);
    for command in &ctx.framework().options().commands {
        embed = embed.field(
            format!("/{}", command.name),
            command.description.as_deref().unwrap_or(""),
            false,
        );
    }
    embed = embed
        .field(
            "Message's templates cheatsheet",
            ctx.data()
                .langs
                .message(language, "message_template_cheat_sheet")
                .to_string(),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new("TyrBot - 📖 Help"));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Displays the latency between the bot and the discord API
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    ctx.say(format!("💫 Pong! ({} ms)", latency.as_millis()))
        .await?;
    Ok(())
}

/// Generates a QR code from the specified content, sent in DM
#[poise::command(slash_command)]
pub async fn qr(
    ctx: Context<'_>,
    #[description = "The content to be encoded in the QR code"] content: String,
) -> Result<(), Error> {
    let language = guild_language(&ctx).await;
    let png = qr_png(&content)?;

    let dm_text = ctx
        .data()
        .langs
        .message(language, "qr_code_message")
        .to_string();
    ctx.author()
        .direct_message(
            ctx.http(),
            serenity::CreateMessage::new()
                .content(dm_text)
                .add_file(serenity::CreateAttachment::bytes(png, "qr_code.png")),
        )
        .await?;

    say_key(&ctx, language, "qr_code_sent").await
}

/// Encode arbitrary content as a black-on-white QR code PNG, 10px modules
fn qr_png(content: &str) -> Result<Vec<u8>, Error> {
    let code = qrcode::QrCode::new(content.as_bytes())?;
    let qr_image = code
        .render::<image::Luma<u8>>()
        .module_dimensions(10, 10)
        .build();

    let mut png_bytes: Vec<u8> = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes).write_image(
        qr_image.as_raw(),
        qr_image.width(),
        qr_image.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_output_is_a_square_png_with_dark_and_light_modules() {
        let png = qr_png("https://example.com").unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();

        let (width, height) = decoded.dimensions();
        assert_eq!(width, height);
        assert_eq!(width % 10, 0);
        assert!(decoded.pixels().any(|p| p[0] < 128));
        assert!(decoded.pixels().any(|p| p[0] > 128));
    }

    #[test]
    fn qr_encoding_is_deterministic() {
        let first = qr_png("same content").unwrap();
        let second = qr_png("same content").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, qr_png("other content").unwrap());
    }
}
