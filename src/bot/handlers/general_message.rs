use teloxide::prelude::*;

use crate::services::keyboard::KeyboardRegistry;

/// Terminal endpoint for messages no other branch claimed. Nothing here
/// replies; keyboard presses and stray commands are only logged.
pub async fn handle_general_message(
    msg: Message,
    keyboards: KeyboardRegistry,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.starts_with('/') {
        tracing::debug!(
            "Ignoring unrecognized command {:?} in chat {}",
            text,
            msg.chat.id
        );
        return Ok(());
    }

    if let Some(user) = msg.from() {
        if keyboards.is_active(user.id).await {
            tracing::info!(
                "Keyboard reply from {} in chat {}: {:?}",
                user.id,
                msg.chat.id,
                text
            );
        }
    }

    Ok(())
}
