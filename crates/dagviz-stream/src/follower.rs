//! The connection loop.
//!
//! [`Follower`] owns the [`TangleState`] and multiplexes three inputs on one
//! task: frames from the node's WebSocket, operator lines from stdin, and
//! the stats ticker. After every input it drains the render outbox and
//! writes each command as one JSON line.
//!
//! A dropped connection is retried forever after a fixed delay. The node
//! replays nothing on reconnect, so the state is reset whenever a new
//! connection replaces an old one.

use std::future;
use std::time::Duration;

use dagviz_core::{DagvizConfig, OperatorCommand, TangleState, TangleStats};
use dagviz_types::VertexId;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tokio::time::{Interval, MissedTickBehavior, interval, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::error::StreamError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    /// The socket closed or failed; reconnect.
    Disconnected,
    /// The process was asked to stop.
    Shutdown,
}

/// Follows the event stream and writes render commands to `out`.
pub struct Follower<W> {
    config: DagvizConfig,
    state: TangleState,
    out: W,
    /// Operator input, `None` once stdin reached end of file.
    stdin: Option<Lines<BufReader<Stdin>>>,
    /// Stats ticker, `None` when disabled.
    ticker: Option<Interval>,
}

impl<W: AsyncWrite + Unpin> Follower<W> {
    /// Create a follower that reads operator commands from stdin.
    pub fn new(config: DagvizConfig, state: TangleState, out: W) -> Self {
        let ticker = (config.stream.stats_interval_ms > 0).then(|| {
            let mut ticker = interval(Duration::from_millis(config.stream.stats_interval_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self {
            config,
            state,
            out,
            stdin: Some(BufReader::new(tokio::io::stdin()).lines()),
            ticker,
        }
    }

    /// Connect, follow, and reconnect until Ctrl-C.
    pub async fn run(mut self) -> Result<(), StreamError> {
        let delay_ms = self.config.stream.reconnect_delay_ms;
        let delay = Duration::from_millis(delay_ms);
        let url = self.config.stream.url.clone();
        let mut connected_before = false;

        loop {
            match connect_async(url.as_str()).await {
                Ok((socket, _response)) => {
                    if connected_before {
                        self.state.reset();
                        self.flush().await?;
                    }
                    connected_before = true;
                    info!(url = %url, "connection opened");

                    if self.follow(socket).await? == Ended::Shutdown {
                        info!("shutting down");
                        return Ok(());
                    }
                    warn!(url = %url, "connection closed");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "connection error");
                }
            }

            debug!(delay_ms, "reconnecting after delay");
            tokio::select! {
                () = sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    return Ok(());
                }
            }
        }
    }

    async fn follow(&mut self, mut socket: Socket) -> Result<Ended, StreamError> {
        loop {
            tokio::select! {
                frame = socket.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => self.handle_frame(text),
                        Err(e) => warn!(error = %e, "binary frame is not UTF-8, skipped"),
                    },
                    Some(Ok(Message::Close(close))) => {
                        debug!(?close, "close frame received");
                        return Ok(Ended::Disconnected);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket error");
                        return Ok(Ended::Disconnected);
                    }
                    None => return Ok(Ended::Disconnected),
                },
                line = next_line(&mut self.stdin) => match line {
                    Ok(Some(line)) => self.handle_line(&line),
                    Ok(None) => {
                        debug!("operator input closed");
                        self.stdin = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "operator input failed");
                        self.stdin = None;
                    }
                },
                () = tick(&mut self.ticker) => log_stats(&self.state.stats()),
                _ = tokio::signal::ctrl_c() => {
                    if let Err(e) = socket.close(None).await {
                        debug!(error = %e, "close handshake failed");
                    }
                    return Ok(Ended::Shutdown);
                }
            }
            self.flush().await?;
        }
    }

    /// Apply one text frame. Malformed frames are logged and skipped.
    pub fn handle_frame(&mut self, frame: &str) {
        if let Err(e) = self.state.handle_frame(frame) {
            warn!(error = %e, "frame skipped");
        }
    }

    /// Run one operator line. Unparseable lines are logged and ignored.
    pub fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let command = match line.parse::<OperatorCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(line, error = %e, "operator command rejected");
                return;
            }
        };

        if let OperatorCommand::Select(id) | OperatorCommand::Search(id) = &command {
            let id = VertexId::from(id.trim());
            if !id.is_empty() {
                info!(vertex_id = %id, link = %self.state.explorer_link(&id), "explorer");
            }
        }
        if let Some(stats) = self.state.execute(command) {
            log_stats(&stats);
        }
    }

    /// Write every pending render command, or drop them when output is off.
    pub async fn flush(&mut self) -> Result<(), StreamError> {
        let commands = self.state.take_render_commands();
        if !self.config.render.emit_commands || commands.is_empty() {
            return Ok(());
        }
        let mut buf = String::new();
        for command in &commands {
            buf.push_str(&serde_json::to_string(command)?);
            buf.push('\n');
        }
        self.out.write_all(buf.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

/// Next operator line, or never when stdin is closed.
async fn next_line(stdin: &mut Option<Lines<BufReader<Stdin>>>) -> std::io::Result<Option<String>> {
    match stdin {
        Some(lines) => lines.next_line().await,
        None => future::pending().await,
    }
}

/// Next stats tick, or never when the ticker is disabled.
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}

fn log_stats(stats: &TangleStats) {
    info!(
        vertices = stats.vertices,
        limit = stats.limit,
        nodes = stats.nodes,
        links = stats.links,
        markers = stats.markers,
        pending_links = stats.pending_links,
        live_draw = stats.live_draw,
        paused = stats.paused,
        selected = ?stats.selected,
        ancestors = stats.ancestors,
        descendants = stats.descendants,
        events = stats.events,
        "tangle stats"
    );
}
