//! Resolve the distinct authors of a message set and their guild nicknames.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::DiscordApi;
use crate::error::Result;
use crate::types::{Message, Participant};

/// Distinct authors in first-seen order, nicknames unresolved.
pub fn unique_authors<'a, I>(messages: I) -> Vec<Participant>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|m| seen.insert(m.author.id.clone()))
        .map(|m| Participant::from_author(&m.author))
        .collect()
}

/// Builds the participant roster for `messages` in `guild_id`.
///
/// Lookups run one at a time. If any member lookup fails the whole
/// resolution fails: a partial roster would make the transcript misleading.
pub async fn resolve_participants<A>(
    api: &A,
    messages: &[Message],
    guild_id: &str,
) -> Result<Vec<Participant>>
where
    A: DiscordApi + ?Sized,
{
    let mut participants = unique_authors(messages);
    debug!(guild_id, count = participants.len(), "resolving participant nicknames");

    for participant in &mut participants {
        let member = api
            .get_guild_member(guild_id, &participant.id)
            .await
            .map_err(|e| {
                warn!(
                    guild_id,
                    user_id = %participant.id,
                    error = %e,
                    "member lookup failed"
                );
                e
            })?;
        participant.nickname = member.nickname();
    }

    Ok(participants)
}
