// Cross-cutting prompt fragments owned by the client itself.
// Feature prompts live next to the feature (see generation::prompts).

use super::Provider;

/// System prompt for the provider self-test round trip.
pub const CONNECTIVITY_SYSTEM: &str =
    "You are a connectivity probe. Reply with the requested sentence only.";

pub fn connectivity_prompt(provider: Provider) -> String {
    format!("Say '{} connection successful'", provider.display_name())
}
