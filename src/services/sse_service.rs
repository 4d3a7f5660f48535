use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{dto::sse::ServerEvent, state::SharedState};

/// Convert a chat subscription into an SSE response, forwarding events until the client leaves.
///
/// Once the client is gone the game's channel is released if this was its last subscriber.
pub fn to_sse_stream(
    state: SharedState,
    mut receiver: broadcast::Receiver<ServerEvent>,
    game_id: i64,
    user_id: i64,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(game_id, user_id, skipped, "chat subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        drop(receiver);
        state.chat().prune(game_id);
        info!(game_id, user_id, "chat stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
