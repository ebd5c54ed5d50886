use crate::CommandMeta;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

pub fn no_commands_message(category: Option<&str>) -> String {
    match category {
        Some(cat) => format!("No commands found in category: {}", display_category(cat)),
        None => "No commands are registered.".to_owned(),
    }
}

pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!(
            "`{}`: {}\n-# {}\n",
            command.name, command.desc, command.usage
        ));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{grouped_help_description, unknown_category_message};
    use crate::CommandMeta;

    const A: CommandMeta = CommandMeta {
        name: "ping",
        desc: "Replies with Pong!",
        category: "utility",
        usage: "/ping",
    };
    const B: CommandMeta = CommandMeta {
        name: "config",
        desc: "Configure bot settings.",
        category: "admin",
        usage: "/config <set|view>",
    };

    #[test]
    fn groups_under_category_headers() {
        let text = grouped_help_description(&[&B, &A]);
        assert_eq!(
            text,
            "**Admin**\n`config`: Configure bot settings.\n-# /config <set|view>\n\n\
             **Utility**\n`ping`: Replies with Pong!\n-# /ping"
        );
    }

    #[test]
    fn unknown_category_lists_valid_ones() {
        assert_eq!(
            unknown_category_message("fun", &["admin", "utility"]),
            "Unknown category: Fun\nValid categories: Admin, Utility"
        );
    }
}
