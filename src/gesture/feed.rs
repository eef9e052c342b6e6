//! MQTT feed of gesture states
//!
//! An external hand tracker publishes one JSON `GestureState` per frame. The
//! feed subscribes on a background thread and hands the newest state to the
//! render loop.

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::GestureState;
use crate::config::MqttConfig;
use crate::error::{Error, Result};

const CLIENT_ID: &str = "riftgate";

/// Parse one gesture payload. Returns `None` for empty or malformed input.
pub fn decode_gesture(payload: &[u8]) -> Option<GestureState> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

/// MQTT subscriber that receives gesture states in a background thread
pub struct GestureFeed {
    receiver: Receiver<GestureState>,
    // Dropping the client would end the connection's request stream
    _client: Client,
    _thread: thread::JoinHandle<()>,
}

impl GestureFeed {
    /// Connect to the broker and subscribe.
    /// Fails immediately if the broker cannot be reached.
    pub fn connect(config: &MqttConfig) -> Result<Self> {
        let mut options = MqttOptions::new(CLIENT_ID, config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(config.topic.as_str(), QoS::AtMostOnce)
            .map_err(|e| Error::mqtt(format!("failed to subscribe to '{}': {}", config.topic, e)))?;

        // Poll once so an unreachable broker fails here rather than in the thread
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(Error::mqtt(format!(
                    "failed to connect to {}:{} - {}",
                    config.host, config.port, e
                )));
            },
            None => {
                return Err(Error::mqtt(format!(
                    "failed to connect to {}:{} - connection closed",
                    config.host, config.port
                )));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic = config.topic.clone();
        let handle = thread::spawn(move || {
            Self::message_loop(connection, &sender, &topic);
        });

        info!(host = %config.host, port = config.port, topic = %config.topic, "gesture feed connected");

        Ok(Self {
            receiver,
            _client: client,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: Connection, sender: &Sender<GestureState>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic != topic {
                        continue;
                    }
                    match decode_gesture(&publish.payload) {
                        Some(gesture) => {
                            if sender.send(gesture).is_err() {
                                // Render loop gone
                                break;
                            }
                        },
                        None => warn!(bytes = publish.payload.len(), "ignoring malformed gesture payload"),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // rumqttc reconnects on the next poll
                    warn!(error = %e, "gesture feed error");
                    thread::sleep(Duration::from_millis(500));
                },
            }
        }
    }

    /// Latest gesture state received since the last poll, discarding older ones
    pub fn poll(&self) -> Option<GestureState> {
        let mut latest = None;
        while let Ok(gesture) = self.receiver.try_recv() {
            latest = Some(gesture);
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let payload = br#"{
            "hands": 2,
            "pinch": [true, false],
            "pinch_pos": [[0.25, 0.75], null],
            "two_hand_distance": 0.4,
            "rotation": -0.2,
            "pushing": false
        }"#;
        let g = decode_gesture(payload).unwrap();
        assert_eq!(g.hands, 2);
        assert_eq!(g.primary_pinch(), Some([0.25, 0.75]));
        assert_eq!(g.pinch_pos[1], None);
        assert!((g.rotation + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_decode_partial_payload_defaults() {
        let g = decode_gesture(br#" {"hands": 1, "pushing": true} "#).unwrap();
        assert!(g.pushing);
        assert_eq!(g.two_hand_distance, 0.0);
        assert_eq!(g.pinch, [false, false]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_gesture(b""), None);
        assert_eq!(decode_gesture(b"   "), None);
        assert_eq!(decode_gesture(b"open"), None);
        assert_eq!(decode_gesture(&[0xff, 0xfe]), None);
    }
}
