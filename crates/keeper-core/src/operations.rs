//! Clean and transcribe orchestration.
//!
//! Each operation runs strictly sequentially against one channel. The
//! interaction handler does not wait for them: [`ChannelKeeper::spawn_clean`]
//! and [`ChannelKeeper::spawn_transcribe`] run the work on a Tokio task and
//! log the outcome.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use keeper_discord::{
    collect_message_ids, collect_messages, resolve_participants, CollectOptions, DiscordApi,
    MAX_PAGE_SIZE,
};

use crate::context::OperationContext;
use crate::error::{OperationError, Result};
use crate::mailer::{Email, Mailer, DEFAULT_FROM};
use crate::report::{ReportKind, Transcript};

/// Outcome of a clean run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanSummary {
    /// Non-pinned messages found.
    pub requested: usize,
    pub deleted: usize,
    pub failed: usize,
    /// The page ceiling stopped collection early; older messages remain.
    pub truncated: bool,
}

/// Outcome of a transcribe or archive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeSummary {
    pub kind: ReportKind,
    pub message_count: usize,
    pub participant_count: usize,
    pub recipients: Vec<String>,
    pub truncated: bool,
    /// Whether the confirmation reached the channel.
    pub confirmed: bool,
}

/// Runs channel operations against Discord and the mail provider.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct ChannelKeeper {
    api: Arc<dyn DiscordApi>,
    mailer: Arc<dyn Mailer>,
    from: String,
    max_pages: Option<usize>,
}

impl ChannelKeeper {
    pub fn new(api: Arc<dyn DiscordApi>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            api,
            mailer,
            from: DEFAULT_FROM.to_string(),
            max_pages: None,
        }
    }

    /// Overrides the sender identity.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Caps how many history pages one operation may fetch.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn collect_options(&self) -> CollectOptions {
        CollectOptions::new(MAX_PAGE_SIZE).with_max_pages(self.max_pages)
    }

    /// Deletes every non-pinned message in the channel.
    ///
    /// Deletions run one at a time. A failed deletion is logged and counted;
    /// the rest still run. If collection fails nothing is deleted.
    pub async fn clean(&self, ctx: &OperationContext) -> Result<CleanSummary> {
        info!(
            channel_id = %ctx.channel_id,
            channel = %ctx.channel_name,
            user = %ctx.requested_by.username,
            "cleaning channel"
        );

        let ids = collect_message_ids(
            self.api.as_ref(),
            &ctx.channel_id,
            self.collect_options(),
            |m| !m.pinned,
        )
        .await?;

        let reason = ctx.audit_reason();
        let mut summary = CleanSummary {
            requested: ids.len(),
            truncated: ids.truncated,
            ..CleanSummary::default()
        };

        for message_id in &ids.items {
            match self
                .api
                .delete_message(&ctx.channel_id, message_id, &reason)
                .await
            {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        channel_id = %ctx.channel_id,
                        message_id = %message_id,
                        error = %e,
                        "failed to delete message"
                    );
                }
            }
        }

        info!(
            channel_id = %ctx.channel_id,
            "deleted {}/{} non-pinned messages",
            summary.deleted,
            summary.requested
        );
        Ok(summary)
    }

    /// Emails the channel history to `recipients`, subject dated today
    /// (local time).
    pub async fn transcribe(
        &self,
        ctx: &OperationContext,
        kind: ReportKind,
        recipients: &[String],
    ) -> Result<TranscribeSummary> {
        self.transcribe_on(ctx, kind, recipients, Local::now().date_naive())
            .await
    }

    /// [`transcribe`](Self::transcribe) with an explicit subject date.
    pub async fn transcribe_on(
        &self,
        ctx: &OperationContext,
        kind: ReportKind,
        recipients: &[String],
        date: NaiveDate,
    ) -> Result<TranscribeSummary> {
        let guild_id = ctx.guild_id.as_deref().ok_or(OperationError::MissingGuild)?;
        if recipients.is_empty() {
            return Err(OperationError::NoRecipients);
        }

        info!(
            kind = %kind,
            channel_id = %ctx.channel_id,
            channel = %ctx.channel_name,
            user = %ctx.requested_by.username,
            "preparing channel export"
        );

        let guild = self.api.get_guild(guild_id).await?;

        let history = collect_messages(
            self.api.as_ref(),
            &ctx.channel_id,
            self.collect_options(),
            |_| true,
        )
        .await?;
        let truncated = history.truncated;

        let participants =
            resolve_participants(self.api.as_ref(), &history.items, guild_id).await?;

        let transcript = Transcript::new(
            kind,
            ctx.channel_name.clone(),
            guild.name,
            participants,
            history.items,
        );

        let email = Email {
            from: self.from.clone(),
            to: recipients.to_vec(),
            subject: kind.subject(&ctx.channel_name, date),
            text: transcript.render_text(),
            html: transcript.render_html(),
        };
        self.mailer.send(&email).await?;

        let message_count = transcript.message_count();
        info!(
            kind = %kind,
            channel_id = %ctx.channel_id,
            messages = message_count,
            recipients = recipients.len(),
            "export emailed"
        );

        let confirmation = kind.confirmation(recipients, message_count);
        let confirmed = match self
            .api
            .create_message(&ctx.channel_id, &confirmation)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(channel_id = %ctx.channel_id, error = %e, "failed to post confirmation");
                false
            }
        };

        Ok(TranscribeSummary {
            kind,
            message_count,
            participant_count: transcript.participants.len(),
            recipients: recipients.to_vec(),
            truncated,
            confirmed,
        })
    }

    /// Runs [`clean`](Self::clean) in the background, logging any failure.
    pub fn spawn_clean(&self, ctx: OperationContext) -> JoinHandle<()> {
        let keeper = self.clone();
        tokio::spawn(async move {
            if let Err(e) = keeper.clean(&ctx).await {
                error!(channel_id = %ctx.channel_id, error = %e, "clean failed");
            }
        })
    }

    /// Runs [`transcribe`](Self::transcribe) in the background, logging any
    /// failure.
    pub fn spawn_transcribe(
        &self,
        ctx: OperationContext,
        kind: ReportKind,
        recipients: Vec<String>,
    ) -> JoinHandle<()> {
        let keeper = self.clone();
        tokio::spawn(async move {
            if let Err(e) = keeper.transcribe(&ctx, kind, &recipients).await {
                error!(
                    kind = %kind,
                    channel_id = %ctx.channel_id,
                    error = %e,
                    "export failed"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestingUser;
    use crate::mailer::MailError;
    use async_trait::async_trait;
    use keeper_discord::mock::{message, MockDiscord};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<Email>>,
        reject: bool,
    }

    impl RecordingMailer {
        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &Email) -> crate::mailer::Result<()> {
            if self.reject {
                return Err(MailError::Rejected {
                    status: 422,
                    message: "invalid recipient".into(),
                });
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn ctx() -> OperationContext {
        OperationContext::new("chan", "tavern", RequestingUser::new("42", "wren")).with_guild("g")
    }

    fn keeper(api: &Arc<MockDiscord>, mailer: &Arc<RecordingMailer>) -> ChannelKeeper {
        ChannelKeeper::new(api.clone(), mailer.clone())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 14).unwrap()
    }

    fn recipients() -> Vec<String> {
        vec!["gm@example.com".to_string(), "scribe@example.com".to_string()]
    }

    #[tokio::test]
    async fn test_clean_skips_pinned() {
        let api = Arc::new(MockDiscord::new().with_messages(
            "chan",
            vec![
                message(1, "a", "alice", 1, false),
                message(2, "a", "alice", 2, true),
                message(3, "b", "bob", 3, false),
                message(4, "b", "bob", 4, false),
            ],
        ));
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer).clean(&ctx()).await.unwrap();

        assert_eq!(
            summary,
            CleanSummary {
                requested: 3,
                deleted: 3,
                failed: 0,
                truncated: false
            }
        );
        assert_eq!(api.page_sizes(), vec![4]);

        let deletes = api.deletes();
        let deleted: Vec<&str> = deletes.iter().map(|d| d.message_id.as_str()).collect();
        assert_eq!(deleted, vec!["4", "3", "1"]);
        assert!(deletes
            .iter()
            .all(|d| d.audit_reason == "Clean command by user wren (ID: 42)"));

        let remaining = api.remaining("chan");
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].pinned);
    }

    #[tokio::test]
    async fn test_clean_issues_n_minus_p_deletes_across_pages() {
        let messages = (1..=250).map(|i| message(i, "a", "alice", i as i64, i % 10 == 0));
        let api = Arc::new(MockDiscord::new().with_messages("chan", messages.collect()));
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer).clean(&ctx()).await.unwrap();

        assert_eq!(summary.requested, 225);
        assert_eq!(api.deletes().len(), 225);
        assert_eq!(api.page_sizes(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_clean_continues_past_failed_delete() {
        let api = Arc::new(
            MockDiscord::new()
                .with_messages(
                    "chan",
                    vec![
                        message(1, "a", "alice", 1, false),
                        message(2, "a", "alice", 2, false),
                        message(3, "a", "alice", 3, false),
                    ],
                )
                .fail_delete_of("2"),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer).clean(&ctx()).await.unwrap();

        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(api.deletes().len(), 3);
        assert_eq!(api.remaining("chan")[0].id, "2");
    }

    #[tokio::test]
    async fn test_clean_collection_failure_deletes_nothing() {
        let messages = (1..=150).map(|i| message(i, "a", "alice", i as i64, false));
        let api = Arc::new(
            MockDiscord::new()
                .with_messages("chan", messages.collect())
                .fail_list_after(1),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let err = keeper(&api, &mailer).clean(&ctx()).await.unwrap_err();

        assert!(matches!(err, OperationError::Discord(_)));
        assert!(api.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_clean_respects_page_ceiling() {
        let messages = (1..=300).map(|i| message(i, "a", "alice", i as i64, false));
        let api = Arc::new(MockDiscord::new().with_messages("chan", messages.collect()));
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer)
            .with_max_pages(Some(1))
            .clean(&ctx())
            .await
            .unwrap();

        assert!(summary.truncated);
        assert_eq!(summary.deleted, 100);
    }

    fn transcribe_fixture() -> MockDiscord {
        MockDiscord::new()
            .with_guild("g", "Guild of Bards")
            .with_member("g", "a", Some("Captain"))
            .with_member("g", "b", None)
            .with_messages(
                "chan",
                vec![
                    message(1, "a", "alice", 1_760_443_200, false),
                    message(2, "b", "bob", 1_760_443_260, true),
                    message(3, "a", "alice", 1_760_443_320, false),
                ],
            )
    }

    #[tokio::test]
    async fn test_transcribe_emails_and_confirms() {
        let api = Arc::new(transcribe_fixture());
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap();

        assert_eq!(summary.message_count, 3);
        assert_eq!(summary.participant_count, 2);
        assert!(summary.confirmed);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.from, DEFAULT_FROM);
        assert_eq!(email.to, recipients());
        assert_eq!(
            email.subject,
            "Transcription of Discord Channel: tavern - 2025-10-14"
        );
        assert!(email
            .text
            .contains("from channel tavern in server: Guild of Bards"));
        // Chronological, pinned messages included.
        let first = email.text.find("message 1").unwrap();
        let second = email.text.find("message 2").unwrap();
        let third = email.text.find("message 3").unwrap();
        assert!(first < second && second < third);
        assert!(email.text.contains("alice (Captain): message 1"));

        let posts = api.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "chan");
        assert!(posts[0]
            .1
            .starts_with("Transcription email sent to: gm@example.com, scribe@example.com.\nTotal messages transcribed: 3."));
    }

    #[tokio::test]
    async fn test_archive_wording() {
        let api = Arc::new(transcribe_fixture());
        let mailer = Arc::new(RecordingMailer::default());

        keeper(&api, &mailer)
            .with_from("Keeper <keeper@example.com>")
            .transcribe_on(&ctx(), ReportKind::Archive, &recipients(), date())
            .await
            .unwrap();

        let email = &mailer.sent()[0];
        assert_eq!(email.from, "Keeper <keeper@example.com>");
        assert!(email.subject.starts_with("Archive of Discord Channel"));
        assert!(api.posts()[0].1.contains("Total messages archived: 3."));
    }

    #[tokio::test]
    async fn test_transcribe_requires_guild() {
        let api = Arc::new(transcribe_fixture());
        let mailer = Arc::new(RecordingMailer::default());
        let dm = OperationContext::new("chan", "dm", RequestingUser::new("42", "wren"));

        let err = keeper(&api, &mailer)
            .transcribe_on(&dm, ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::MissingGuild));
        assert!(api.list_calls().is_empty());
    }

    #[tokio::test]
    async fn test_transcribe_requires_recipients() {
        let api = Arc::new(transcribe_fixture());
        let mailer = Arc::new(RecordingMailer::default());

        let err = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &[], date())
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::NoRecipients));
    }

    #[tokio::test]
    async fn test_unknown_guild_aborts_before_collection() {
        let api = Arc::new(MockDiscord::new());
        let mailer = Arc::new(RecordingMailer::default());

        let err = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Discord(_)));
        assert!(api.list_calls().is_empty());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_member_lookup_sends_nothing() {
        let api = Arc::new(
            MockDiscord::new()
                .with_guild("g", "Guild of Bards")
                .with_member("g", "a", None)
                .with_messages(
                    "chan",
                    vec![
                        message(1, "a", "alice", 1, false),
                        message(2, "gone", "ghost", 2, false),
                    ],
                ),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let err = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Discord(_)));
        assert!(mailer.sent().is_empty());
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_skips_confirmation() {
        let api = Arc::new(transcribe_fixture());
        let mailer = Arc::new(RecordingMailer::rejecting());

        let err = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Delivery(_)));
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_confirmation_is_not_an_error() {
        let api = Arc::new(transcribe_fixture().fail_posts());
        let mailer = Arc::new(RecordingMailer::default());

        let summary = keeper(&api, &mailer)
            .transcribe_on(&ctx(), ReportKind::Transcription, &recipients(), date())
            .await
            .unwrap();

        assert!(!summary.confirmed);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_clean_runs_to_completion() {
        let api = Arc::new(
            MockDiscord::new().with_messages("chan", vec![message(1, "a", "alice", 1, false)]),
        );
        let mailer = Arc::new(RecordingMailer::default());

        keeper(&api, &mailer).spawn_clean(ctx()).await.unwrap();

        assert_eq!(api.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_transcribe_swallows_errors() {
        let api = Arc::new(MockDiscord::new());
        let mailer = Arc::new(RecordingMailer::default());

        // Unknown guild: the task logs and finishes without panicking.
        keeper(&api, &mailer)
            .spawn_transcribe(ctx(), ReportKind::Archive, recipients())
            .await
            .unwrap();

        assert!(mailer.sent().is_empty());
    }
}
