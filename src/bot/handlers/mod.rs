pub mod general_message;
pub mod message;

use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::{self, Command};

/// Wires the message-handling chain: known commands first, then the
/// `/5м`-style shorthand, and finally the log-only observer for everything
/// else.
pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(message::command_handler),
        )
        .branch(
            dptree::filter_map(|msg: Message| msg.text().and_then(commands::parse_relative))
                .endpoint(commands::timer::handle_relative),
        )
        .endpoint(general_message::handle_general_message)
}
