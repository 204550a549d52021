use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove};

use crate::bot::commands::display_handle;
use crate::services::keyboard::KeyboardRegistry;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_validation_error,
};

pub async fn handle_see(
    bot: Bot,
    msg: Message,
    args: String,
    keyboards: KeyboardRegistry,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = display_handle(user);
    log_command_start("/see", &username, user.id.0, chat_id.0, Some(&args));

    match keyboards.show(user.id, &args).await {
        Ok(labels) => {
            log_command_success(
                "/see",
                &username,
                user.id.0,
                chat_id.0,
                Some(&format!("{} labels", labels.len())),
            );
            let count = labels.len();
            // One button per row, in the order the labels were given
            let rows: Vec<Vec<KeyboardButton>> = labels
                .into_iter()
                .map(|label| vec![KeyboardButton::new(label)])
                .collect();
            let markup = KeyboardMarkup::new(rows).resize_keyboard(true);
            bot.send_message(
                chat_id,
                format!("Keyboard with {count} buttons is up. Hide it with /stop"),
            )
            .reply_markup(markup)
            .await?;
        }
        Err(e) => {
            log_validation_error(
                "/see",
                "labels",
                &args,
                &e.to_string(),
                &username,
                user.id.0,
                chat_id.0,
            );
            CommandFeedback::new(bot, chat_id)
                .validation_error(
                    &e.to_string(),
                    "List the button labels separated by commas, e.g. /see да,нет",
                )
                .await?;
        }
    }

    Ok(())
}

pub async fn handle_stop(bot: Bot, msg: Message, keyboards: KeyboardRegistry) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = display_handle(user);
    log_command_start("/stop", &username, user.id.0, chat_id.0, None);

    match keyboards.hide(user.id).await {
        Ok(()) => {
            log_command_success("/stop", &username, user.id.0, chat_id.0, None);
            bot.send_message(chat_id, "Keyboard hidden")
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        Err(e) => {
            log_command_error("/stop", &username, user.id.0, chat_id.0, &e.to_string());
            CommandFeedback::new(bot, chat_id).error(&e.to_string()).await?;
        }
    }

    Ok(())
}
