use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::engine;
use crate::domain::player_view::PlayerGameView;
use crate::domain::roster::{GameId, UserId};
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::games::GameService;
use crate::state::app_state::AppState;
use crate::ws::hub::WsRegistry;
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        Uuid::new_v4(),
        current_user.id,
        app_state.games(),
        app_state.ws_registry(),
    );
    ws::start(session, &req, stream)
}

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum HubEvent {
    GameState(Box<PlayerGameView>),
}

/// A game command decoded from a client frame.
enum Command {
    Transmit { word: String, number: f64 },
    Decode { tile: usize },
    EndTurn,
}

pub struct WsSession {
    conn_id: Uuid,
    user_id: UserId,
    games: Arc<GameService>,
    registry: Arc<WsRegistry>,

    last_heartbeat: Instant,
    hello_done: bool,
}

impl WsSession {
    fn new(
        conn_id: Uuid,
        user_id: UserId,
        games: Arc<GameService>,
        registry: Arc<WsRegistry>,
    ) -> Self {
        Self {
            conn_id,
            user_id,
            games,
            registry,
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let msg = ServerMsg::Error {
            code,
            message: message.into(),
        };
        Self::send_json(ctx, &msg);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    user_id = %actor.user_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Runs a game command through the service. The resulting state comes
    /// back through the hub like any other update.
    fn dispatch(&self, game_id: GameId, command: Command, ctx: &mut ws::WebsocketContext<Self>) {
        let games = self.games.clone();
        let user_id = self.user_id;
        let conn_id = self.conn_id;

        ctx.spawn(
            async move {
                let result = match command {
                    Command::Transmit { word, number } => match engine::clue_number(number) {
                        Ok(number) => games.give_clue(game_id, user_id, &word, number, None).await,
                        Err(err) => Err(err),
                    },
                    Command::Decode { tile } => games.make_guess(game_id, user_id, tile, None).await,
                    Command::EndTurn => games.end_turn(game_id, user_id, None).await,
                };
                result.map_err(AppError::from)
            }
            .into_actor(self)
            .map(move |res, _actor, ctx| match res {
                Ok(stored) => {
                    Self::send_json(
                        ctx,
                        &ServerMsg::Ack {
                            message: format!("applied v{}", stored.version),
                        },
                    );
                }
                Err(AppError::Internal { detail, .. }) => {
                    tracing::error!(
                        game_id = %game_id,
                        conn_id = %conn_id,
                        detail = %detail,
                        "[WS SESSION] command failed"
                    );
                    Self::send_json(
                        ctx,
                        &ServerMsg::Error {
                            code: ErrorCode::Internal,
                            message: "Internal error".to_string(),
                        },
                    );
                }
                Err(err) => {
                    Self::send_json(
                        ctx,
                        &ServerMsg::Rejected {
                            game_id,
                            code: err.code().as_str().to_string(),
                            message: err.detail().to_string(),
                        },
                    );
                }
            }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            user_id = %self.user_id,
            "[WS SESSION] started"
        );

        let recipient = ctx.address().recipient::<HubEvent>();
        self.registry
            .register_connection(self.user_id, self.conn_id, recipient);

        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.unregister_connection(self.conn_id);
        info!(
            conn_id = %self.conn_id,
            user_id = %self.user_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                let (game_id, command) = match cmd {
                    ClientMsg::Hello { protocol } => {
                        if protocol != PROTOCOL_VERSION {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadProtocol,
                                "Unsupported protocol version",
                            );
                            return;
                        }
                        self.hello_done = true;
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                                user_id: self.user_id,
                            },
                        );
                        return;
                    }
                    ClientMsg::Transmit {
                        game_id,
                        word,
                        number,
                    } => (game_id, Command::Transmit { word, number }),
                    ClientMsg::Decode { game_id, tile } => (game_id, Command::Decode { tile }),
                    ClientMsg::EndTurn { game_id } => (game_id, Command::EndTurn),
                };

                if !self.hello_done {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Must send hello first");
                    return;
                }
                self.dispatch(game_id, command, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    user_id = %self.user_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<HubEvent> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: HubEvent, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            HubEvent::GameState(view) => {
                Self::send_json(ctx, &ServerMsg::GameState { game: *view });
            }
        }
    }
}
