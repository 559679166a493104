//! One live WebSocket session against the gateway.
//!
//! A session runs from a successful handshake until the user quits or
//! the transport drops. Everything longer-lived (the timeline, the
//! coordinator, the audio service, the title badge) is owned by the
//! runner and survives across sessions.

use std::time::{Duration, Instant};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use renraku_shared::protocol::{ClientEvent, ServerEvent};
use renraku_shared::time::now_millis;
use renraku_shared::types::{Identity, MessageKind, OrderId, UserId};

use crate::audio::AudioService;
use crate::error::ClientError;
use crate::formatter::MessageFormatter;
use crate::notify::{Channel, Coordinator, Delivery, TitleBadge, Visibility};
use crate::reconcile::OrderTimeline;
use crate::ui::redisplay_prompt;

/// Handshake attempts beyond this are treated as failed and retried.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Liveness probe cadence.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Input within this window counts as "looking at the terminal".
const FOREGROUND_WINDOW: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;

/// Connection parameters, fixed for the process lifetime.
pub struct SessionConfig {
    pub url: String,
    pub token: Option<String>,
    pub order_id: OrderId,
}

/// State that outlives individual sessions.
pub struct ClientContext {
    pub timeline: OrderTimeline,
    pub coordinator: Coordinator,
    pub audio: AudioService,
    pub badge: TitleBadge<std::io::Stdout>,
    pub identity: Option<Identity>,
    last_input_at: Option<Instant>,
}

impl ClientContext {
    pub fn new(
        timeline: OrderTimeline,
        coordinator: Coordinator,
        audio: AudioService,
        badge: TitleBadge<std::io::Stdout>,
    ) -> Self {
        Self {
            timeline,
            coordinator,
            audio,
            badge,
            identity: None,
            last_input_at: None,
        }
    }

    fn me(&self) -> Option<&UserId> {
        self.identity.as_ref().and_then(|i| i.user_id())
    }

    fn visibility(&self, now: Instant) -> Visibility {
        match self.last_input_at {
            Some(at) if now.duration_since(at) < FOREGROUND_WINDOW => Visibility::Foreground,
            _ => Visibility::Background,
        }
    }

    /// Re-derive the title badge from the unread counters.
    pub fn refresh_badge(&mut self) {
        let unread =
            self.timeline.unread_count(self.me()) + self.coordinator.unread_notifications();
        self.badge.set_unread(unread).ok();
    }

    /// Apply a read receipt from the gateway. When the reader is this
    /// user (another tab of the same account), the local notification
    /// counter resets too, matching what `/read` does here. Returns
    /// whether the reader was this user.
    pub fn apply_read_receipt(&mut self, reader_id: &UserId) -> bool {
        self.timeline.mark_read_by(reader_id);
        let own_read = Some(reader_id) == self.me();
        if own_read {
            self.coordinator.mark_notifications_read();
        }
        self.refresh_badge();
        own_read
    }
}

/// Why a session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to exit; the runner must not reconnect.
    UserQuit,
    /// The transport dropped after a successful handshake.
    ConnectionLost,
}

/// Run one session: connect, join the order room, then pump events
/// until the user quits or the connection drops.
pub async fn run_session(
    config: &SessionConfig,
    ctx: &mut ClientContext,
) -> Result<SessionEnd, ClientError> {
    let url = match &config.token {
        Some(token) => format!("{}?token={}", config.url, token),
        None => config.url.clone(),
    };

    let connect = tokio::time::timeout(HANDSHAKE_TIMEOUT, connect_async(&url)).await;
    let (ws_stream, _response) = match connect {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => return Err(ClientError::Connection(e.to_string())),
        Err(_) => return Err(ClientError::HandshakeTimeout(HANDSHAKE_TIMEOUT.as_secs())),
    };

    tracing::info!("Connected to gateway at {}", config.url);

    let (mut ws_sink, mut ws_source) = ws_stream.split();

    // Blocking thread for rustyline; lines flow over a channel.
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = config.order_id.to_string();
    std::thread::spawn(move || read_input_lines(&prompt, input_tx));

    // Internal bus for events that are not wire traffic (image loads).
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalEvent>();

    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ping.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            frame = ws_source.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_frame(config, ctx, &mut ws_sink, &internal_tx, &text).await?;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        return Ok(SessionEnd::ConnectionLost);
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Ok(SessionEnd::ConnectionLost);
                    }
                    Some(Ok(_)) => {}
                }
            }
            line = input_rx.recv() => {
                match line {
                    Some(line) => {
                        if handle_input(config, ctx, &mut ws_sink, &line).await? {
                            return Ok(SessionEnd::UserQuit);
                        }
                    }
                    // Readline thread ended (Ctrl+C / Ctrl+D).
                    None => return Ok(SessionEnd::UserQuit),
                }
            }
            event = internal_rx.recv() => {
                if let Some(InternalEvent::ImageLoaded { message_id }) = event {
                    // Exactly one re-render per loaded image asset.
                    println!("\n* image of message '{}' loaded", message_id);
                    redisplay_prompt(config.order_id.as_str());
                }
            }
            _ = ping.tick() => {
                send_event(&mut ws_sink, &ClientEvent::Ping).await?;
            }
        }
    }
}

enum InternalEvent {
    ImageLoaded { message_id: String },
}

fn read_input_lines(prompt: &str, input_tx: mpsc::UnboundedSender<String>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize readline: {}", e);
            return;
        }
    };

    let prompt = format!("{}> ", prompt);
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                tracing::info!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                tracing::info!("EOF");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }
}

/// Handle one line of user input. Returns `true` when the user quit.
async fn handle_input(
    config: &SessionConfig,
    ctx: &mut ClientContext,
    ws_sink: &mut WsSink,
    line: &str,
) -> Result<bool, ClientError> {
    // Any keystroke is the user gesture that arms audio and counts as
    // foreground attention.
    ctx.audio.arm();
    ctx.last_input_at = Some(Instant::now());

    match line {
        "/quit" => return Ok(true),
        "/read" => {
            send_event(
                ws_sink,
                &ClientEvent::MarkMessagesRead {
                    order_id: config.order_id.clone(),
                },
            )
            .await?;
            ctx.coordinator.mark_notifications_read();
            ctx.refresh_badge();
            return Ok(false);
        }
        _ => {}
    }

    let sender = match ctx.me().cloned() {
        Some(user_id) => user_id,
        None => {
            println!("\n! anonymous connections cannot send messages");
            redisplay_prompt(config.order_id.as_str());
            return Ok(false);
        }
    };

    let (body, kind) = match line.strip_prefix("/image ") {
        Some(url) => (url.to_string(), MessageKind::Image),
        None => (line.to_string(), MessageKind::Text),
    };

    let temp_id = ctx
        .timeline
        .push_optimistic(sender, body.clone(), kind, now_millis());

    // Optimistic echo before the server has seen anything.
    if let Some(entry) = ctx.timeline.messages().iter().find(|m| m.id == temp_id) {
        println!("\n{}", MessageFormatter::format_line(entry, ctx.me()));
        redisplay_prompt(config.order_id.as_str());
    }

    send_event(
        ws_sink,
        &ClientEvent::SendMessage {
            order_id: config.order_id.clone(),
            body,
            kind,
            temp_id,
        },
    )
    .await?;

    Ok(false)
}

/// Handle one server frame.
async fn handle_frame(
    config: &SessionConfig,
    ctx: &mut ClientContext,
    ws_sink: &mut WsSink,
    internal_tx: &mpsc::UnboundedSender<InternalEvent>,
    raw: &str,
) -> Result<(), ClientError> {
    let event = match serde_json::from_str::<ServerEvent>(raw) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Unparseable frame: {}", e);
            return Ok(());
        }
    };

    match event {
        ServerEvent::Connected { identity } => {
            print!("{}", MessageFormatter::format_connected(&identity));
            ctx.identity = Some(identity);
            // Room membership never survives a reconnect; re-join
            // explicitly on every handshake.
            send_event(
                ws_sink,
                &ClientEvent::JoinOrderRoom {
                    order_id: config.order_id.clone(),
                },
            )
            .await?;
        }
        ServerEvent::RoomSnapshot { order_id, messages } => {
            ctx.timeline.merge(messages, now_millis());
            print!(
                "{}",
                MessageFormatter::format_snapshot(&order_id, ctx.timeline.messages(), ctx.me())
            );
            redisplay_prompt(config.order_id.as_str());
            ctx.refresh_badge();
        }
        ServerEvent::NewMessage { message } => {
            let own = Some(&message.sender_id) == ctx.me();
            if message.kind == MessageKind::Image && message.body.starts_with("http") {
                spawn_image_load(internal_tx.clone(), message.id.clone(), message.body.clone());
            }
            ctx.timeline.apply_authoritative(message.clone());
            if !own {
                let now = Instant::now();
                let visibility = ctx.visibility(now);
                if let Some(delivery) = ctx.coordinator.on_message(&message, visibility, now) {
                    execute_delivery(config, ctx, &delivery, || {
                        MessageFormatter::format_incoming(&message, None)
                    });
                }
            }
            ctx.refresh_badge();
        }
        ServerEvent::MessageAck { temp_id, message } => {
            ctx.timeline.acknowledge(&temp_id, message.clone());
            print!("{}", MessageFormatter::format_ack(&message));
            redisplay_prompt(config.order_id.as_str());
        }
        ServerEvent::MessagesMarkedRead { order_id, reader_id } => {
            if !ctx.apply_read_receipt(&reader_id) {
                print!(
                    "{}",
                    MessageFormatter::format_read_receipt(&order_id, &reader_id)
                );
                redisplay_prompt(config.order_id.as_str());
            }
        }
        ServerEvent::NewNotification { notification } => {
            let now = Instant::now();
            let visibility = ctx.visibility(now);
            if let Some(delivery) = ctx
                .coordinator
                .on_notification(&notification, visibility, now)
            {
                execute_delivery(config, ctx, &delivery, || {
                    MessageFormatter::format_notification(&notification)
                });
            }
            ctx.refresh_badge();
        }
        ServerEvent::OrderStatusUpdated { order_id, status } => {
            print!("{}", MessageFormatter::format_status_update(&order_id, &status));
            redisplay_prompt(config.order_id.as_str());
        }
        ServerEvent::Pong => {
            tracing::debug!("Pong received");
        }
        ServerEvent::Error {
            kind,
            detail,
            temp_id,
        } => {
            if let Some(temp_id) = temp_id {
                // A failed send must not linger as if delivered.
                ctx.timeline.fail_send(&temp_id);
            }
            tracing::warn!("Server error ({:?}): {}", kind, detail);
            print!("{}", MessageFormatter::format_error(&detail));
            redisplay_prompt(config.order_id.as_str());
        }
    }

    Ok(())
}

/// Execute an accepted delivery over its chosen channels.
fn execute_delivery<F>(
    config: &SessionConfig,
    ctx: &mut ClientContext,
    delivery: &Delivery,
    render_toast: F,
) where
    F: Fn() -> String,
{
    for channel in delivery.channels {
        match channel {
            Channel::InlineToast => {
                print!("{}", render_toast());
                redisplay_prompt(config.order_id.as_str());
            }
            Channel::BackgroundNotification => {
                ctx.audio.request_background_notification(
                    &delivery.title,
                    &delivery.body,
                    &delivery.tag,
                );
            }
            Channel::Audio => {
                ctx.audio.play(&delivery.tag);
            }
        }
    }
}

/// Fetch an image asset once; completion raises exactly one internal
/// re-render event instead of a cascade of blind refresh timers.
fn spawn_image_load(
    internal_tx: mpsc::UnboundedSender<InternalEvent>,
    message_id: String,
    url: String,
) {
    tokio::spawn(async move {
        match reqwest::get(&url).await {
            Ok(response) => {
                let _ = response.bytes().await;
                let _ = internal_tx.send(InternalEvent::ImageLoaded { message_id });
            }
            Err(e) => {
                tracing::debug!("Image load for '{}' failed: {}", message_id, e);
            }
        }
    });
}

async fn send_event(ws_sink: &mut WsSink, event: &ClientEvent) -> Result<(), ClientError> {
    let json = serde_json::to_string(event).map_err(|e| ClientError::Connection(e.to_string()))?;
    ws_sink
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))
}
