use teloxide::prelude::*;

use crate::bot::commands::{display_handle, RelativeReminder};
use crate::services::scheduler::TimerScheduler;
use crate::utils::datetime::{format_datetime, parse_datetime, ACCEPTED_FORMATS};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_validation_error,
};

pub async fn handle_timer(
    bot: Bot,
    msg: Message,
    args: String,
    scheduler: TimerScheduler,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    // Channel posts carry no sender; nobody would own the timer
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = display_handle(user);
    log_command_start("/timer", &username, user.id.0, chat_id.0, Some(&args));

    let feedback = CommandFeedback::new(bot, chat_id);

    let Some((datetime_input, text)) = split_timer_args(&args) else {
        log_validation_error(
            "/timer",
            "args",
            &args,
            "expected a time and a message",
            &username,
            user.id.0,
            chat_id.0,
        );
        feedback
            .validation_error(
                "A reminder needs both a time and a message",
                &format!("Try /timer 18:00 tea, where the time is {ACCEPTED_FORMATS}"),
            )
            .await?;
        return Ok(());
    };

    let fire_at = match parse_datetime(&datetime_input, scheduler.now()) {
        Ok(dt) => dt,
        Err(e) => {
            log_validation_error(
                "/timer",
                "time",
                &datetime_input,
                &e.to_string(),
                &username,
                user.id.0,
                chat_id.0,
            );
            feedback.error(&e.to_string()).await?;
            return Ok(());
        }
    };

    match scheduler
        .schedule_at(user.id, chat_id, &username, text, fire_at)
        .await
    {
        Ok(timer) => {
            log_command_success(
                "/timer",
                &username,
                user.id.0,
                chat_id.0,
                Some(&format!("timer {}", timer.id)),
            );
            feedback
                .success(&format!(
                    "Reminder {} set for {}. Cancel it with /cancel {}",
                    timer.id,
                    format_datetime(&timer.fire_at),
                    timer.id
                ))
                .await?;
        }
        Err(e) => {
            log_command_error("/timer", &username, user.id.0, chat_id.0, &e.to_string());
            feedback.error(&e.to_string()).await?;
        }
    }

    Ok(())
}

pub async fn handle_relative(
    bot: Bot,
    msg: Message,
    reminder: RelativeReminder,
    scheduler: TimerScheduler,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = display_handle(user);
    log_command_start("relative", &username, user.id.0, chat_id.0, msg.text());

    let feedback = CommandFeedback::new(bot, chat_id);

    let amount = match reminder.amount.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            // Only an absurd number of digits can land here
            log_validation_error(
                "relative",
                "amount",
                &reminder.amount,
                "does not fit a 64-bit number",
                &username,
                user.id.0,
                chat_id.0,
            );
            feedback
                .error(&format!("\"{}\" is not a delay I can count", reminder.amount))
                .await?;
            return Ok(());
        }
    };

    match scheduler
        .schedule_in(user.id, chat_id, &username, &reminder.text, amount, reminder.unit)
        .await
    {
        Ok(timer) => {
            log_command_success(
                "relative",
                &username,
                user.id.0,
                chat_id.0,
                Some(&format!("timer {}", timer.id)),
            );
            feedback
                .success(&format!(
                    "Reminder {} set for {}. Cancel it with /cancel {}",
                    timer.id,
                    format_datetime(&timer.fire_at),
                    timer.id
                ))
                .await?;
        }
        Err(e) => {
            log_command_error("relative", &username, user.id.0, chat_id.0, &e.to_string());
            feedback.error(&e.to_string()).await?;
        }
    }

    Ok(())
}

/// Splits `/timer` arguments into the date/time input and the reminder text.
/// A colon in the second token marks a date+time pair; otherwise the first
/// token alone must be the time. Text keeps its internal spacing.
fn split_timer_args(args: &str) -> Option<(String, &str)> {
    let args = args.trim();
    let (first, rest) = args.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (second, tail) = match rest.split_once(char::is_whitespace) {
        Some((second, tail)) => (second, tail.trim_start()),
        None => (rest, ""),
    };

    if second.contains(':') {
        if tail.is_empty() {
            return None;
        }
        Some((format!("{first} {second}"), tail))
    } else {
        Some((first.to_string(), rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_time_only() {
        let (input, text) = split_timer_args("18:00 пей чай").unwrap();
        assert_eq!(input, "18:00");
        assert_eq!(text, "пей чай");
    }

    #[test]
    fn test_split_date_and_time() {
        let (input, text) = split_timer_args("15.06.2024 18:00 standup").unwrap();
        assert_eq!(input, "15.06.2024 18:00");
        assert_eq!(text, "standup");

        let (input, text) = split_timer_args("15.06 18:00 standup").unwrap();
        assert_eq!(input, "15.06 18:00");
        assert_eq!(text, "standup");
    }

    #[test]
    fn test_split_keeps_inner_text_spacing() {
        let (_, text) = split_timer_args("18:00 two  spaces kept").unwrap();
        assert_eq!(text, "two  spaces kept");
    }

    #[test]
    fn test_split_needs_time_and_text() {
        assert!(split_timer_args("").is_none());
        assert!(split_timer_args("18:00").is_none());
        assert!(split_timer_args("15.06.2024 18:00").is_none());
    }

    #[test]
    fn test_split_passes_garbage_through_for_the_parser_to_reject() {
        // Not this function's job to validate the time itself
        let (input, text) = split_timer_args("tomorrow tea").unwrap();
        assert_eq!(input, "tomorrow");
        assert_eq!(text, "tea");
    }
}
