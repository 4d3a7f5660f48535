use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Per-game broadcast channels feeding the chat streams.
///
/// A channel is created on first subscription and dropped once its last receiver goes away, either
/// when a stream closes or when a publish finds nobody listening.
pub struct ChatHub {
    channels: DashMap<i64, broadcast::Sender<ServerEvent>>,
    capacity: usize,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Register a subscriber for the messages of `game_id` published from now on.
    pub fn subscribe(&self, game_id: i64) -> broadcast::Receiver<ServerEvent> {
        self.channels
            .entry(game_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send `event` to the current subscribers of `game_id`, ignoring delivery errors.
    pub fn publish(&self, game_id: i64, event: ServerEvent) {
        let Some(sender) = self.channels.get(&game_id).map(|entry| entry.clone()) else {
            return;
        };

        if sender.send(event).is_err() {
            self.prune(game_id);
        }
    }

    /// Drop the channel of `game_id` if nobody is subscribed to it any more.
    pub fn prune(&self, game_id: i64) {
        self.channels
            .remove_if(&game_id, |_, sender| sender.receiver_count() == 0);
    }

    /// Number of games with an open channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> ServerEvent {
        ServerEvent::new(Some("message".into()), text.into())
    }

    #[tokio::test]
    async fn subscribers_only_receive_their_game() {
        let hub = ChatHub::new(8);
        let mut first = hub.subscribe(1);
        let mut second = hub.subscribe(2);

        hub.publish(1, event("hello"));

        assert_eq!(first.recv().await.unwrap().data, "hello");
        assert!(second.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_drops_the_channel() {
        let hub = ChatHub::new(8);
        drop(hub.subscribe(1));
        assert_eq!(hub.channel_count(), 1);

        hub.publish(1, event("anyone?"));
        assert_eq!(hub.channel_count(), 0);
    }

    #[test]
    fn pruning_keeps_channels_that_still_have_listeners() {
        let hub = ChatHub::new(8);
        let first = hub.subscribe(1);
        let second = hub.subscribe(1);

        drop(first);
        hub.prune(1);
        assert_eq!(hub.channel_count(), 1);

        drop(second);
        hub.prune(1);
        assert_eq!(hub.channel_count(), 0);
    }

    #[test]
    fn publishing_to_unknown_game_is_a_no_op() {
        let hub = ChatHub::new(8);
        hub.publish(3, event("nobody"));
        assert_eq!(hub.channel_count(), 0);
    }
}
