pub mod cancel;
pub mod keyboard;
pub mod timer;

use teloxide::types::User;
use teloxide::utils::command::BotCommands;

use crate::services::scheduler::TimeUnit;
use crate::utils::datetime::ACCEPTED_FORMATS;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Reminder bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Schedule a reminder: /timer <time> <text>")]
    Timer(String),
    #[command(description = "Cancel a reminder by id: /cancel <id>")]
    Cancel(String),
    #[command(description = "Show a custom keyboard: /see <label,label,...>")]
    See(String),
    #[command(description = "Hide the custom keyboard")]
    Stop,
}

/// Fixed usage summary sent for /start.
pub fn usage_text() -> String {
    format!(
        "🔔 I send one-shot reminders.\n\n\
         /timer <time> <text> - remind at a moment; time is {ACCEPTED_FORMATS}\n\
         /5м <text> - remind after a delay (units: с/м/ч/д or s/m/h/d)\n\
         /cancel <id> - cancel a reminder you scheduled\n\
         /see <label1,label2> - show a custom reply keyboard\n\
         /stop - hide it again"
    )
}

/// A `/<amount><unit> <text>` shorthand, e.g. `/5м чай` or `/30s stretch`.
///
/// The amount stays a string until the handler parses it, so an oversized
/// number still reaches the user as a proper error instead of silently
/// falling through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeReminder {
    pub amount: String,
    pub unit: TimeUnit,
    pub text: String,
}

/// Recognizes the relative-reminder shorthand in a message text. Returns
/// `None` for anything else so the message can keep flowing through the
/// handler chain.
pub fn parse_relative(text: &str) -> Option<RelativeReminder> {
    let rest = text.strip_prefix('/')?;
    let (head, tail) = match rest.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (rest, ""),
    };
    // Group chats append the bot mention: /5м@some_bot
    let head = match head.split_once('@') {
        Some((h, _)) => h,
        None => head,
    };
    let digits_end = head.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 || tail.is_empty() {
        return None;
    }
    let (amount, unit_token) = head.split_at(digits_end);
    let unit = TimeUnit::from_token(unit_token)?;
    Some(RelativeReminder {
        amount: amount.to_string(),
        unit,
        text: tail.to_string(),
    })
}

/// `@username` when the user has one, first name otherwise.
pub fn display_handle(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => user.first_name.clone(),
    }
}
