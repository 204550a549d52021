use teloxide::prelude::*;

use crate::bot::commands::display_handle;
use crate::services::scheduler::TimerScheduler;
use crate::utils::datetime::format_datetime;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_validation_error,
};

pub async fn handle_cancel(
    bot: Bot,
    msg: Message,
    args: String,
    scheduler: TimerScheduler,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = display_handle(user);
    log_command_start("/cancel", &username, user.id.0, chat_id.0, Some(&args));

    let feedback = CommandFeedback::new(bot, chat_id);

    let trimmed = args.trim();
    let id = match trimmed.parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            log_validation_error(
                "/cancel",
                "id",
                trimmed,
                "not a timer id",
                &username,
                user.id.0,
                chat_id.0,
            );
            let error_msg = if trimmed.is_empty() {
                "Which reminder? An id is needed".to_string()
            } else {
                format!("\"{trimmed}\" is not a timer id")
            };
            feedback
                .validation_error(
                    &error_msg,
                    "Use the number from the scheduling confirmation, e.g. /cancel 3",
                )
                .await?;
            return Ok(());
        }
    };

    match scheduler.cancel(id, user.id).await {
        Ok(cancelled) => {
            log_command_success(
                "/cancel",
                &username,
                user.id.0,
                chat_id.0,
                Some(&format!("timer {id}")),
            );
            feedback
                .success(&format!(
                    "Cancelled reminder {} (\"{}\", was due {})",
                    cancelled.id,
                    cancelled.text,
                    format_datetime(&cancelled.fire_at)
                ))
                .await?;
        }
        Err(e) => {
            log_command_error("/cancel", &username, user.id.0, chat_id.0, &e.to_string());
            feedback.error(&e.to_string()).await?;
        }
    }

    Ok(())
}
