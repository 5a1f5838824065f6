//! Store key layout. Each device owns two independent keys.

use wmoc_core::DeviceId;

pub const MESSAGES_KEY_PREFIX: &str = "miner_messages_";
pub const COMMANDS_KEY_PREFIX: &str = "miner_commands_";

/// Key holding a device's message log.
pub fn messages_key(device: &DeviceId) -> String {
    format!("{}{}", MESSAGES_KEY_PREFIX, device)
}

/// Key holding a device's pending commands.
pub fn commands_key(device: &DeviceId) -> String {
    format!("{}{}", COMMANDS_KEY_PREFIX, device)
}
