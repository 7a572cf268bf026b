//! Transcript rendering.
//!
//! A [`Transcript`] is the channel history in chronological order plus the
//! participant roster. It renders to the plain text and HTML bodies of the
//! outgoing email.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use keeper_discord::{Message, Participant};

/// Project page linked from every email footer.
pub const PROJECT_URL: &str = "https://github.com/jeffinnes/scene-keeper";

/// Log line timestamp, e.g. `Tue, 14 Oct 2025 12:00:00 GMT`.
const LOG_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Which export was requested. Controls wording only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Transcription,
    Archive,
}

impl ReportKind {
    /// Capitalised noun: "Transcription" / "Archive".
    pub fn title(&self) -> &'static str {
        match self {
            Self::Transcription => "Transcription",
            Self::Archive => "Archive",
        }
    }

    /// Lowercase noun used mid-sentence.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::Archive => "archive",
        }
    }

    /// Past participle: "transcribed" / "archived".
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Transcription => "transcribed",
            Self::Archive => "archived",
        }
    }

    /// Email subject for a channel on a given day.
    pub fn subject(&self, channel_name: &str, date: NaiveDate) -> String {
        format!(
            "{} of Discord Channel: {} - {}",
            self.title(),
            channel_name,
            date.format("%Y-%m-%d")
        )
    }

    /// Message posted back into the channel once the email is out.
    pub fn confirmation(&self, recipients: &[String], message_count: usize) -> String {
        format!(
            "{title} email sent to: {to}.\n\
             Total messages {verb}: {count}.\n\
             Once you have confirmed receipt of the {noun} email, you may wish to use the `/clean` command to clear non-pinned messages from this channel.",
            title = self.title(),
            to = recipients.join(", "),
            verb = self.verb(),
            count = message_count,
            noun = self.noun(),
        )
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A channel history ready to render.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub kind: ReportKind,
    pub channel_name: String,
    pub guild_name: String,
    pub participants: Vec<Participant>,
    /// Oldest first.
    pub messages: Vec<Message>,
}

impl Transcript {
    /// Builds a transcript, sorting `messages` ascending by timestamp.
    ///
    /// The sort is stable: messages sharing a timestamp keep their input
    /// order.
    pub fn new(
        kind: ReportKind,
        channel_name: impl Into<String>,
        guild_name: impl Into<String>,
        participants: Vec<Participant>,
        mut messages: Vec<Message>,
    ) -> Self {
        messages.sort_by_key(|m| m.timestamp);
        Self {
            kind,
            channel_name: channel_name.into(),
            guild_name: guild_name.into(),
            participants,
            messages,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn heading(&self) -> String {
        format!(
            "{} of Discord messages from channel {} in server: {}",
            self.kind.title(),
            self.channel_name,
            self.guild_name
        )
    }

    fn nicknames(&self) -> HashMap<&str, &str> {
        self.participants
            .iter()
            .filter_map(|p| p.nickname.as_deref().map(|nick| (p.id.as_str(), nick)))
            .collect()
    }

    /// Plain text email body.
    pub fn render_text(&self) -> String {
        let nicknames = self.nicknames();
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.heading());
        out.push_str("\nParticipants:\n");
        for participant in &self.participants {
            let _ = writeln!(out, "- {}", participant.display_name());
        }

        out.push_str("\nMessages:\n");
        for message in &self.messages {
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                log_date(&message.timestamp),
                speaker(message, &nicknames),
                message.content
            );
        }

        out.push_str("\nEND OF TRANSCRIPT\n\n");
        out.push_str("This email was generated by the Scene Keeper Bot\n");
        let _ = writeln!(out, "{}", PROJECT_URL);
        out
    }

    /// HTML email body. User-supplied text is escaped.
    pub fn render_html(&self) -> String {
        let nicknames = self.nicknames();
        let mut out = String::new();

        out.push_str("<html>\n  <body>\n");
        let _ = writeln!(out, "    <h2>{}</h2>", escape_html(&self.heading()));

        out.push_str("    <h3>Participants:</h3>\n");
        out.push_str(
            "    <ul style=\"border: 1px solid #000; padding: 10px; list-style-type: none;\">\n",
        );
        for participant in &self.participants {
            let _ = writeln!(
                out,
                "      <li>{}</li>",
                escape_html(&participant.display_name())
            );
        }
        out.push_str("    </ul>\n");

        out.push_str("    <h3>Messages:</h3>\n");
        out.push_str(
            "    <div style=\"border: 1px solid #000; padding: 10px; font-family: monospace;\">\n",
        );
        for message in &self.messages {
            let _ = writeln!(
                out,
                "      <div><p style=\"margin-bottom: 0px;\">[{}] {}:</p> \
                 <p style=\"font-weight: bold; margin-top: 0px;\">{}</p></div>",
                log_date(&message.timestamp),
                escape_html(&speaker(message, &nicknames)),
                escape_html(&message.content)
            );
        }
        out.push_str("    </div>\n");

        let _ = writeln!(
            out,
            "    <footer>\n      <p>This email was generated by the <a href=\"{}\">Scene Keeper Bot.</a></p>\n    </footer>",
            PROJECT_URL
        );
        out.push_str("  </body>\n</html>\n");
        out
    }
}

fn log_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(LOG_DATE_FORMAT).to_string()
}

/// `username` or `username (nickname)`.
fn speaker(message: &Message, nicknames: &HashMap<&str, &str>) -> String {
    match nicknames.get(message.author.id.as_str()) {
        Some(nick) => format!("{} ({})", message.author.username, nick),
        None => message.author.username.clone(),
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
