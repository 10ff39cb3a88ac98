//! Message routing.
//!
//! Picks the first bot-directed message out of each inbound batch, runs it
//! through the interpreter and sends the reply back to the same channel.
//! One batch is read per tick and fully handled before the next read.

use std::time::Duration;

use serenity::async_trait;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::bot::interpreter::Interpreter;
use crate::challonge::TournamentApi;
use crate::common::error::{ChatError, CommandError};
use crate::common::types::{ChannelId, InboundEvent};

/// Sent instead of a listing when any API read fails.
pub const FAILURE_TEXT: &str =
    "Sorry, I couldn't reach Challonge to answer that. Please try again later.";

/// Source of inbound chat events, read once per tick.
#[async_trait]
pub trait EventSource: Send {
    /// Everything received since the previous read. May be empty.
    async fn read_events(&mut self) -> Vec<InboundEvent>;
}

/// Outbound chat messages.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), ChatError>;
}

/// Find the first event addressed to the bot.
///
/// `mentions` lists every token form that addresses the bot. The command is
/// the text after the earliest occurrence of any of them, trimmed and
/// lower-cased. Events without text or channel are skipped.
pub fn extract_command<M: AsRef<str>>(
    events: &[InboundEvent],
    mentions: &[M],
) -> Option<(String, ChannelId)> {
    events.iter().find_map(|event| {
        let text = event.text.as_deref()?;
        let channel = event.channel?;
        let (start, token) = mentions
            .iter()
            .map(|token| -> &str { token.as_ref() })
            .filter_map(|token| text.find(token).map(|start| (start, token)))
            .min_by_key(|(start, _)| *start)?;
        let after = &text[start + token.len()..];
        Some((after.trim().to_lowercase(), channel))
    })
}

pub struct Router<'a, A: ?Sized, S: ?Sized> {
    mentions: Vec<String>,
    interpreter: Interpreter<'a, A>,
    sink: &'a S,
}

impl<'a, A, S> Router<'a, A, S>
where
    A: TournamentApi + ?Sized,
    S: ChatSink + ?Sized,
{
    pub fn new(mentions: Vec<String>, api: &'a A, sink: &'a S) -> Self {
        Self {
            mentions,
            interpreter: Interpreter::new(api),
            sink,
        }
    }

    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    /// Handle one inbound batch. Returns `true` if a command was dispatched.
    pub async fn handle_batch(&self, events: &[InboundEvent]) -> bool {
        match extract_command(events, &self.mentions) {
            Some((command, channel)) => {
                self.dispatch(&command, channel).await;
                true
            }
            None => false,
        }
    }

    async fn dispatch(&self, command: &str, channel: ChannelId) {
        info!("Command '{}' in channel {}", command, channel);

        let reply = match self.interpreter.respond(command).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Command '{}' failed: {}", command, e);
                if let CommandError::Fetch(ref fetch) = e {
                    debug!("Failed resource: {}", fetch.path());
                }
                FAILURE_TEXT.to_string()
            }
        };

        if let Err(e) = self.sink.send(channel, &reply).await {
            warn!("{}", e);
        }
    }

    /// Poll `source` every `tick` until `shutdown` flips to true.
    pub async fn run<E>(&self, source: &mut E, tick: Duration, mut shutdown: watch::Receiver<bool>)
    where
        E: EventSource + ?Sized,
    {
        let mut ticker = interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Listening for {} every {:?}", self.mentions.join(" or "), tick);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let events = source.read_events().await;
                    if !events.is_empty() {
                        debug!("Read {} inbound events", events.len());
                    }
                    self.handle_batch(&events).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, stopping poll loop");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::bot::commands::HELP_TEXT;
    use crate::bot::interpreter::tests::{weekly_api, FakeApi};
    use crate::config::mention_tokens;

    const MENTION: &str = "<@1234>";

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(ChannelId, String)>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<(ChannelId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        async fn send(&self, channel: ChannelId, text: &str) -> Result<(), ChatError> {
            self.sent.lock().unwrap().push((channel, text.to_string()));
            Ok(())
        }
    }

    /// Replays scripted batches, then requests shutdown.
    struct ScriptedSource {
        batches: VecDeque<Vec<InboundEvent>>,
        shutdown_tx: watch::Sender<bool>,
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn read_events(&mut self) -> Vec<InboundEvent> {
            match self.batches.pop_front() {
                Some(batch) => batch,
                None => {
                    let _ = self.shutdown_tx.send(true);
                    Vec::new()
                }
            }
        }
    }

    #[test]
    fn test_no_mention_yields_none() {
        let events = vec![
            InboundEvent::message(1, "matches 42"),
            InboundEvent::message(2, "hey <@999> tournaments"),
            InboundEvent::default(),
        ];
        assert_eq!(extract_command(&events, &[MENTION]), None);
        assert_eq!(extract_command::<&str>(&[], &[MENTION]), None);
    }

    #[test]
    fn test_extract_text_after_mention() {
        let events = vec![InboundEvent::message(7, "<@1234>   Matches 42  ")];
        assert_eq!(
            extract_command(&events, &[MENTION]),
            Some(("matches 42".to_string(), 7))
        );
    }

    #[test]
    fn test_extract_uses_first_mention_occurrence() {
        let events = vec![InboundEvent::message(7, "yo <@1234> tournaments <@1234> x")];
        assert_eq!(
            extract_command(&events, &[MENTION]),
            Some(("tournaments <@1234> x".to_string(), 7))
        );
    }

    #[test]
    fn test_extract_nickname_mention() {
        let tokens = mention_tokens(1234);
        let events = vec![InboundEvent::message(8, "<@!1234> Tournaments")];
        assert_eq!(
            extract_command(&events, &tokens),
            Some(("tournaments".to_string(), 8))
        );
    }

    #[test]
    fn test_extract_earliest_mention_form_wins() {
        let tokens = mention_tokens(1234);
        let events = vec![InboundEvent::message(8, "<@!1234> matches 42 <@1234> tournaments")];
        assert_eq!(
            extract_command(&events, &tokens),
            Some(("matches 42 <@1234> tournaments".to_string(), 8))
        );
    }

    #[tokio::test]
    async fn test_nickname_mention_is_dispatched() {
        let api = weekly_api();
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        let dispatched = router
            .handle_batch(&[InboundEvent::message(9, "<@!1234> tournaments")])
            .await;

        assert!(dispatched);
        assert_eq!(sink.sent(), vec![(9, "**Tournaments:**\nWeekly (id: 42)".to_string())]);
    }

    #[test]
    fn test_extract_first_matching_event_wins() {
        let events = vec![
            InboundEvent::message(1, "unrelated"),
            InboundEvent {
                text: Some("<@1234> tournaments".to_string()),
                channel: None,
            },
            InboundEvent {
                text: None,
                channel: Some(2),
            },
            InboundEvent::message(3, "<@1234> matches"),
            InboundEvent::message(4, "<@1234> tournaments"),
        ];
        assert_eq!(
            extract_command(&events, &[MENTION]),
            Some(("matches".to_string(), 3))
        );
    }

    #[tokio::test]
    async fn test_batch_without_mention_sends_nothing() {
        let api = weekly_api();
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        let dispatched = router
            .handle_batch(&[InboundEvent::message(1, "matches 42")])
            .await;

        assert!(!dispatched);
        assert!(sink.sent().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reply_goes_to_source_channel() {
        let api = weekly_api();
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        router
            .handle_batch(&[InboundEvent::message(55, "<@1234> MATCHES 42")])
            .await;

        assert_eq!(
            sink.sent(),
            vec![(
                55,
                "**Open matches for \"Weekly\":**\nMango vs. Armada\nHbox vs. Mew2King".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_command_gets_help() {
        let api = FakeApi::default();
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        router
            .handle_batch(&[InboundEvent::message(5, "<@1234> foobar")])
            .await;

        assert_eq!(sink.sent(), vec![(5, HELP_TEXT.to_string())]);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_sends_notice_not_partial_listing() {
        let api = weekly_api().failing_on("tournaments/42/participants/12");
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        router
            .handle_batch(&[InboundEvent::message(5, "<@1234> matches 42")])
            .await;

        assert_eq!(sink.sent(), vec![(5, FAILURE_TEXT.to_string())]);
    }

    #[tokio::test]
    async fn test_run_handles_one_command_per_batch_until_shutdown() {
        let api = weekly_api();
        let sink = RecordingSink::default();
        let router = Router::new(mention_tokens(1234), &api, &sink);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut source = ScriptedSource {
            batches: VecDeque::from(vec![
                vec![
                    InboundEvent::message(1, "<@1234> tournaments"),
                    InboundEvent::message(2, "<@1234> foobar"),
                ],
                Vec::new(),
                vec![InboundEvent::message(3, "<@1234> nope")],
            ]),
            shutdown_tx,
        };

        router
            .run(&mut source, Duration::from_millis(1), shutdown_rx)
            .await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], (1, "**Tournaments:**\nWeekly (id: 42)".to_string()));
        assert_eq!(sent[1], (3, HELP_TEXT.to_string()));
    }
}
