//! MQTT-over-TLS session backed by rumqttc's synchronous client.
//!
//! One session per connect attempt: `connect` builds a fresh client, waits
//! for the broker's acknowledgement within a bounded window, and `pump`
//! drains at most one event per call through a short poll timeout so the
//! runtime loop stays cooperative. QoS 0 end to end; a reconnect refetches
//! the shadow snapshot, so nothing depends on redelivery.

use std::time::{Duration, Instant};

use rumqttc::{Client, Connection, ConnectReturnCode, Event, MqttOptions, Packet, QoS};

use crate::shadow::TopicKind;
use crate::transport::{Inbound, Transport};
use crate::trust::TrustMaterial;

/// Bounded wait for the broker's session acknowledgement.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Poll granularity while waiting for the acknowledgement.
const CONNECT_POLL: Duration = Duration::from_millis(500);
/// Poll window per `pump` call; an idle loop wakes this often.
const PUMP_POLL: Duration = Duration::from_millis(250);
/// Outstanding-request capacity handed to the client.
const REQUEST_CAPACITY: usize = 10;

/// Mutual-TLS MQTT session.
pub struct MqttSession {
    endpoint: String,
    port: u16,
    keep_alive: Duration,
    client: Option<Client>,
    connection: Option<Connection>,
    connected: bool,
}

impl MqttSession {
    pub fn new(config: &crate::config::Config) -> Self {
        MqttSession {
            endpoint: config.endpoint.trim().to_owned(),
            port: config.port,
            // The client asserts a 5 second floor on keep-alive.
            keep_alive: config.keep_alive().max(Duration::from_secs(5)),
            client: None,
            connection: None,
            connected: false,
        }
    }

    fn teardown(&mut self) {
        if let Some(client) = self.client.take() {
            let _ = client.disconnect();
        }
        self.connection = None;
        self.connected = false;
    }
}

impl Transport for MqttSession {
    fn connect(&mut self, identity: &str, trust: Option<&TrustMaterial>) -> bool {
        self.teardown();

        if self.endpoint.is_empty() {
            log::warn!("endpoint not configured; cannot connect");
            return false;
        }
        if identity.is_empty() {
            log::warn!("empty client identity; cannot connect");
            return false;
        }

        let mut options = MqttOptions::new(identity, &self.endpoint, self.port);
        options.set_keep_alive(self.keep_alive);
        // Without trust material the handshake proceeds against an empty
        // root store and fails at the TLS layer; the supervisor keeps
        // retrying while the operator fixes the files.
        let (ca, client_auth) = match trust {
            Some(t) => (
                t.ca.clone(),
                Some((t.certificate.clone(), t.private_key.clone())),
            ),
            None => (Vec::new(), None),
        };
        options.set_transport(rumqttc::Transport::tls(ca, client_auth, None));

        let (client, mut connection) = Client::new(options, REQUEST_CAPACITY);

        let started = Instant::now();
        while started.elapsed() < CONNECT_TIMEOUT {
            match connection.recv_timeout(CONNECT_POLL) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    if ack.code == ConnectReturnCode::Success {
                        self.client = Some(client);
                        self.connection = Some(connection);
                        self.connected = true;
                        return true;
                    }
                    log::warn!("broker refused session: {:?}", ack.code);
                    return false;
                }
                Ok(Ok(_)) => {} // outgoing connect traffic; keep waiting
                Ok(Err(e)) => {
                    log::warn!("connect to {}:{} failed: {e}", self.endpoint, self.port);
                    return false;
                }
                Err(_) => {} // poll window elapsed; keep waiting
            }
        }
        log::warn!("connect timed out after {CONNECT_TIMEOUT:?}");
        false
    }

    fn subscribe(&mut self, topic: &str) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        if let Err(e) = client.subscribe(topic, QoS::AtMostOnce) {
            log::warn!("subscribe to {topic} refused: {e}");
        }
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        match client.publish(topic, QoS::AtMostOnce, false, payload) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("publish to {topic} refused: {e}");
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn pump(&mut self) -> Option<Inbound> {
        let connection = self.connection.as_mut()?;
        match connection.recv_timeout(PUMP_POLL) {
            Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                match TopicKind::classify(&publish.topic) {
                    Some(kind) => Some(Inbound {
                        kind,
                        payload: publish.payload.to_vec(),
                    }),
                    None => {
                        log::debug!("dropping message on unrecognized topic {}", publish.topic);
                        None
                    }
                }
            }
            Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                log::warn!("broker closed the session");
                self.connected = false;
                None
            }
            Ok(Ok(_)) => None, // pings, acks, outgoing echoes
            Ok(Err(e)) => {
                log::warn!("session error: {e}");
                self.connected = false;
                None
            }
            Err(_) => None, // quiet poll window
        }
    }
}
