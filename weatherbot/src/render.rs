use weatherbot_core::{Embed, Reply};

pub fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::Embed(embed) => render_embed(embed),
        Reply::Notice { content, ephemeral: true } => format!("(only you can see this) {content}"),
        Reply::Notice { content, ephemeral: false } => content.clone(),
    }
}

/// Plain-text rendering of an embed: title, description, fields, footer.
pub fn render_embed(embed: &Embed) -> String {
    let mut out = vec![strip_bold(&embed.title)];
    out.push("-".repeat(embed.title.chars().count()));

    if let Some(description) = &embed.description {
        out.push(strip_bold(description));
    }

    if !embed.fields.is_empty() {
        let width = embed.fields.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
        out.extend(
            embed
                .fields
                .iter()
                .map(|f| format!("{:<width$}  {}", f.name, f.value, width = width)),
        );
    }

    if let Some(url) = &embed.thumbnail_url {
        out.push(format!("icon: {url}"));
    }
    if let Some(footer) = &embed.footer {
        out.push(format!("({footer})"));
    }

    out.join("\n")
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_renders_fields_aligned() {
        let embed = Embed::new("Weather Overview for Springfield, IL")
            .description("It's currently **clear sky**.")
            .field("Temperature", "72.5°F", true)
            .field("Humidity", "40%", true)
            .footer("Data provided by OpenWeatherMap");

        let text = render_embed(&embed);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Weather Overview for Springfield, IL");
        assert_eq!(lines[2], "It's currently clear sky.");
        assert_eq!(lines[3], "Temperature  72.5°F");
        assert_eq!(lines[4], "Humidity     40%");
        assert_eq!(lines[5], "(Data provided by OpenWeatherMap)");
    }

    #[test]
    fn ephemeral_notice_is_marked() {
        let reply = Reply::Notice { content: "Could not find weather data for 'X'.".into(), ephemeral: true };
        assert_eq!(render_reply(&reply), "(only you can see this) Could not find weather data for 'X'.");
    }
}
