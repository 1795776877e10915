//! Subscription trigger source: connects to an MQTT broker and pushes a sync event
//! on every message received on the configured topic. Connection failures are
//! logged and handled by the client library's automatic reconnection.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS, Transport};
use tracing::{debug, info, warn};

use crate::queue::{QueueSender, TriggerEvent};

/// Immutable MQTT connection parameters.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Scoped subscription resource. Dropping it disconnects and joins the event-loop
/// thread.
pub struct MqttSource {
    client: Client,
    thread: Option<JoinHandle<()>>,
}

impl MqttSource {
    pub fn connect(config: MqttConfig, queue: QueueSender) -> Self {
        let client_id = format!("mapsyncd-{}", process_id());
        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if config.tls {
            options.set_transport(Transport::tls_with_default_config());
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, connection) = Client::new(options, 16);
        client
            .subscribe(&config.topic, QoS::AtMostOnce)
            .expect("initial subscribe request should queue even before the connection is established");

        let topic = config.topic.clone();
        let subscriber = client.clone();
        let thread = thread::spawn(move || run_event_loop(connection, subscriber, topic, queue));

        Self { client, thread: Some(thread) }
    }
}

fn run_event_loop(mut connection: Connection, client: Client, topic: String, queue: QueueSender) {
    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!(%topic, "mqtt connected");
                // Re-subscribe on every (re)connection: a clean session forgets
                // prior subscriptions, so a broker restart or dropped connection
                // that the client reconnects automatically would otherwise stop
                // delivering triggers silently.
                if let Err(err) = client.subscribe(&topic, QoS::AtMostOnce) {
                    warn!(%topic, error = %err, "failed to (re)subscribe");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic == topic {
                    debug!(%topic, "mqtt message received");
                    if queue.send(TriggerEvent::sync("mqtt")).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "mqtt connection error, reconnecting");
            }
        }
    }
}

impl Drop for MqttSource {
    fn drop(&mut self) {
        let _ = self.client.disconnect();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn process_id() -> u32 {
    std::process::id()
}
