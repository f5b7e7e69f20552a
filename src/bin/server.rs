//! Host process for tournament rooms: create rooms, feed them simulation signals, read results.
//! Run with: cargo run --bin server
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Tournament policy comes from PONG_END_SCORE, PONG_BREATHER_MS, PONG_NAMESPACE.

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pong_tournament::{
    MemoryLedger, MemoryTransport, ParticipantId, RoomSignal, Session, Tournament,
    TournamentConfig, TournamentRoom,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

type RoomId = Uuid;

/// Per-room entry: channels into the running room plus last activity time (for cleanup).
struct RoomEntry {
    signals: mpsc::Sender<RoomSignal>,
    state: watch::Receiver<Tournament>,
    transport: MemoryTransport,
    last_activity: Instant,
}

type Rooms = Data<RwLock<HashMap<RoomId, RoomEntry>>>;

struct Host {
    config: TournamentConfig,
    ledger: Arc<MemoryLedger>,
}

/// Finished rooms are dropped after this long without being read.
const FINISHED_ROOM_TIMEOUT: Duration = Duration::from_secs(3600);

/// Live rooms with no signals or reads for this long are abandoned. Dropping the entry closes
/// the signal channel, which ends the tournament and disconnects everyone.
const IDLE_ROOM_TIMEOUT: Duration = Duration::from_secs(6 * 3600);

/// Remove rooms that went quiet as of `now`. Returns how many were removed.
fn evict_idle_rooms(rooms: &mut HashMap<RoomId, RoomEntry>, now: Instant) -> usize {
    let before = rooms.len();
    rooms.retain(|_, entry| {
        let timeout = if entry.state.borrow().expired {
            FINISHED_ROOM_TIMEOUT
        } else {
            IDLE_ROOM_TIMEOUT
        };
        now.saturating_duration_since(entry.last_activity) < timeout
    });
    before - rooms.len()
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateRoomBody {
    /// Display names in bracket order.
    players: Vec<String>,
}

#[derive(Serialize)]
struct CreatedPlayer {
    id: ParticipantId,
    display_name: String,
}

#[derive(Deserialize)]
struct SignalBody {
    player: ParticipantId,
}

#[derive(Deserialize)]
struct RoomPath {
    id: RoomId,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pong-tournament",
    })
}

/// Create a room for four players and start it.
#[post("/api/rooms")]
async fn api_create_room(rooms: Rooms, host: Data<Host>, body: Json<CreateRoomBody>) -> HttpResponse {
    let transport = MemoryTransport::new();
    let players: Vec<CreatedPlayer> = body
        .players
        .iter()
        .map(|name| CreatedPlayer {
            id: Uuid::new_v4(),
            display_name: name.trim().to_string(),
        })
        .collect();
    let tournament = match Tournament::new(players.iter().map(|p| p.id).collect()) {
        Ok(t) => t,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    for p in &players {
        transport.register_session(&host.config.namespace, Session::new(p.id, p.display_name.clone()));
    }

    let ledger = Arc::clone(&host.ledger);
    let room = TournamentRoom::new(tournament, transport.clone(), ledger, host.config.clone());
    let handle = room.spawn();
    let id = Uuid::new_v4();
    let mut g = match rooms.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        RoomEntry {
            signals: handle.signals,
            state: handle.state,
            transport,
            last_activity: Instant::now(),
        },
    );
    log::info!("Room {} created", id);
    HttpResponse::Ok().json(serde_json::json!({ "id": id, "players": players }))
}

/// Current tournament state of a room.
#[get("/api/rooms/{id}")]
async fn api_get_room(rooms: Rooms, path: Path<RoomPath>) -> HttpResponse {
    let mut g = match rooms.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            let t = entry.state.borrow();
            HttpResponse::Ok().json(serde_json::json!({ "phase": t.phase(), "tournament": &*t }))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No room" })),
    }
}

/// Everything the room has broadcast so far.
#[get("/api/rooms/{id}/events")]
async fn api_room_events(rooms: Rooms, path: Path<RoomPath>) -> HttpResponse {
    let g = match rooms.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => {
            let events: Vec<_> = entry
                .transport
                .events()
                .into_iter()
                .map(|e| serde_json::json!({ "event": e.name(), "data": e }))
                .collect();
            HttpResponse::Ok().json(events)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No room" })),
    }
}

/// Report a scored point from the simulation loop.
#[post("/api/rooms/{id}/points")]
async fn api_point_scored(rooms: Rooms, path: Path<RoomPath>, body: Json<SignalBody>) -> HttpResponse {
    forward(rooms, path.id, RoomSignal::PointScored(body.player)).await
}

/// Report that a participant disconnected.
#[post("/api/rooms/{id}/leave")]
async fn api_player_left(rooms: Rooms, path: Path<RoomPath>, body: Json<SignalBody>) -> HttpResponse {
    forward(rooms, path.id, RoomSignal::PlayerLeft(body.player)).await
}

async fn forward(rooms: Rooms, id: RoomId, signal: RoomSignal) -> HttpResponse {
    // Clone the sender out so the lock is not held across the await.
    let sender = {
        let mut g = match rooms.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        match g.get_mut(&id) {
            Some(entry) => {
                entry.last_activity = Instant::now();
                entry.signals.clone()
            }
            None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No room" })),
        }
    };
    match sender.send(signal).await {
        Ok(()) => HttpResponse::Accepted().finish(),
        Err(_) => HttpResponse::Conflict().json(serde_json::json!({ "error": "Tournament is over" })),
    }
}

/// Tournament logs recorded by the ledger.
#[get("/api/ledger")]
async fn api_ledger(host: Data<Host>) -> HttpResponse {
    HttpResponse::Ok().json(host.ledger.entries())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    let config = TournamentConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} (end score {}, namespace {})",
        bind.0,
        bind.1,
        config.end_score,
        config.namespace
    );

    let rooms: Rooms = Data::new(RwLock::new(HashMap::new()));
    let app_host = Data::new(Host {
        config,
        ledger: Arc::new(MemoryLedger::new()),
    });

    // Background task: every 10 minutes, drop finished rooms idle for an hour and live ones idle for 6h
    let rooms_cleanup = rooms.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(10 * 60));
        loop {
            interval.tick().await;
            let mut g = match rooms_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let removed = evict_idle_rooms(&mut g, Instant::now());
            if removed > 0 {
                log::info!("Cleaned up {} idle room(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(rooms.clone())
            .app_data(app_host.clone())
            .service(api_health)
            .service(api_create_room)
            .service(api_get_room)
            .service(api_room_events)
            .service(api_point_scored)
            .service(api_player_left)
            .service(api_ledger)
    })
    .bind(bind)?
    .run()
    .await
}
