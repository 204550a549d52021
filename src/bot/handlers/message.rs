use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::services::keyboard::KeyboardRegistry;
use crate::services::scheduler::TimerScheduler;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    scheduler: TimerScheduler,
    keyboards: KeyboardRegistry,
) -> ResponseResult<()> {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            bot.send_message(msg.chat.id, crate::bot::commands::usage_text())
                .await?;
        }
        Command::Timer(args) => {
            crate::bot::commands::timer::handle_timer(bot, msg, args, scheduler).await?;
        }
        Command::Cancel(args) => {
            crate::bot::commands::cancel::handle_cancel(bot, msg, args, scheduler).await?;
        }
        Command::See(args) => {
            crate::bot::commands::keyboard::handle_see(bot, msg, args, keyboards).await?;
        }
        Command::Stop => {
            crate::bot::commands::keyboard::handle_stop(bot, msg, keyboards).await?;
        }
    }
    Ok(())
}
