use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lifegrid::patterns::{self, parse_pattern};
use lifegrid::{PatternError, SplitMix64, Universe, render};

/// Largest board the server will allocate.
const MAX_CELLS: usize = 1 << 24;
/// Largest PNG frame, in pixels, the server will render.
const MAX_PIXELS: usize = 1 << 24;
/// Largest number of ticks one request may ask for.
const MAX_TICKS: usize = 10_000;

/// One board shared by every client. The universe has no locking of its own.
struct Session {
    universe: Universe,
    rng: SplitMix64,
}

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    fn new(seed: u64) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                universe: Universe::new(),
                rng: SplitMix64::new(seed),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

impl From<PatternError> for ApiError {
    fn from(e: PatternError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize, Debug, PartialEq)]
struct StateResponse {
    width: usize,
    height: usize,
    generation: u64,
    population: usize,
}

impl StateResponse {
    fn of(u: &Universe) -> Self {
        Self {
            width: u.width(),
            height: u.height(),
            generation: u.generation(),
            population: u.population(),
        }
    }
}

#[derive(Deserialize)]
struct SizeRequest {
    width: Option<usize>,
    height: Option<usize>,
}

#[derive(Deserialize, Default)]
struct TickRequest {
    ticks: Option<usize>,
}

#[derive(Deserialize)]
struct CellRequest {
    row: usize,
    col: usize,
}

#[derive(Deserialize, Default)]
struct ResetRequest {
    seed: Option<u64>,
    fill: Option<f64>,
}

#[derive(Deserialize)]
struct PatternRequest {
    name: String,
    row: usize,
    col: usize,
}

#[derive(Deserialize)]
struct PasteRequest {
    text: String,
    row: i64,
    col: i64,
}

#[derive(Deserialize)]
struct CellsFromPatternRequest {
    coords: Vec<i64>,
    min: i64,
    max: i64,
    row_translate: i64,
    col_translate: i64,
    limit: i64,
}

#[derive(Serialize)]
struct StampResponse {
    stamped: usize,
    state: StateResponse,
}

#[derive(Serialize)]
struct CellsResponse {
    width: usize,
    height: usize,
    /// Row-major bytes, 0 dead and 1 alive, base64.
    data: String,
}

#[derive(Deserialize)]
struct FrameQuery {
    scale: Option<usize>,
}

#[derive(Serialize)]
struct FrameResponse {
    width: usize,
    height: usize,
    data_url: String,
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

async fn state_handler(State(app): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::of(&app.lock().universe))
}

async fn size_handler(
    State(app): State<AppState>,
    Json(req): Json<SizeRequest>,
) -> ApiResult<StateResponse> {
    let mut s = app.lock();
    let width = req.width.unwrap_or(s.universe.width());
    let height = req.height.unwrap_or(s.universe.height());
    if req.width.is_none() && req.height.is_none() {
        return Err(ApiError::BadRequest("width or height required".into()));
    }
    match width.checked_mul(height) {
        Some(n) if n <= MAX_CELLS => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "{width}x{height} exceeds {MAX_CELLS} cells"
            )));
        }
    }
    match (req.width, req.height) {
        (Some(w), None) => s.universe.set_width(w),
        (None, Some(h)) => s.universe.set_height(h),
        _ => {
            s.universe.set_size(width, height);
        }
    }
    Ok(Json(StateResponse::of(&s.universe)))
}

async fn tick_handler(
    State(app): State<AppState>,
    req: Option<Json<TickRequest>>,
) -> ApiResult<StateResponse> {
    let ticks = req.and_then(|Json(r)| r.ticks).unwrap_or(1);
    if ticks > MAX_TICKS {
        return Err(ApiError::BadRequest(format!("at most {MAX_TICKS} ticks per request")));
    }
    let state = tokio::task::spawn_blocking(move || {
        let mut s = app.lock();
        s.universe.tick_n(ticks);
        StateResponse::of(&s.universe)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    debug!(ticks, generation = state.generation, "ticked");
    Ok(Json(state))
}

async fn toggle_handler(
    State(app): State<AppState>,
    Json(req): Json<CellRequest>,
) -> ApiResult<StateResponse> {
    let mut s = app.lock();
    if req.row >= s.universe.height() || req.col >= s.universe.width() {
        return Err(ApiError::BadRequest(format!(
            "cell ({}, {}) outside {}x{} board",
            req.row,
            req.col,
            s.universe.width(),
            s.universe.height()
        )));
    }
    s.universe.toggle_cell(req.row, req.col);
    Ok(Json(StateResponse::of(&s.universe)))
}

async fn reset_handler(
    State(app): State<AppState>,
    req: Option<Json<ResetRequest>>,
) -> ApiResult<StateResponse> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let p = req.fill.unwrap_or(0.5);
    if !(0.0..=1.0).contains(&p) {
        return Err(ApiError::BadRequest(format!(
            "fill must be within [0, 1], got {p}"
        )));
    }
    let mut s = app.lock();
    if let Some(seed) = req.seed {
        s.rng = SplitMix64::new(seed);
    }
    let Session { universe, rng } = &mut *s;
    universe.reset_with_probability(rng, p);
    Ok(Json(StateResponse::of(universe)))
}

async fn clear_handler(State(app): State<AppState>) -> Json<StateResponse> {
    let mut s = app.lock();
    s.universe.clear();
    Json(StateResponse::of(&s.universe))
}

async fn pattern_handler(
    State(app): State<AppState>,
    Json(req): Json<PatternRequest>,
) -> ApiResult<StateResponse> {
    let pattern = patterns::find(&req.name)?;
    let mut s = app.lock();
    s.universe.stamp(pattern, req.row, req.col);
    Ok(Json(StateResponse::of(&s.universe)))
}

async fn paste_handler(
    State(app): State<AppState>,
    Json(req): Json<PasteRequest>,
) -> ApiResult<StampResponse> {
    let parsed = parse_pattern(&req.text)?;
    let coords = parsed.coords();
    let mut s = app.lock();
    let stamped = s.universe.cells_from_pattern(
        &coords,
        i64::MIN,
        i64::MAX,
        req.row,
        req.col,
        parsed.cells.len() as i64,
    );
    Ok(Json(StampResponse {
        stamped,
        state: StateResponse::of(&s.universe),
    }))
}

async fn cells_from_pattern_handler(
    State(app): State<AppState>,
    Json(req): Json<CellsFromPatternRequest>,
) -> Json<StampResponse> {
    let mut s = app.lock();
    let stamped = s.universe.cells_from_pattern(
        &req.coords,
        req.min,
        req.max,
        req.row_translate,
        req.col_translate,
        req.limit,
    );
    Json(StampResponse {
        stamped,
        state: StateResponse::of(&s.universe),
    })
}

async fn render_handler(State(app): State<AppState>) -> String {
    app.lock().universe.render()
}

async fn cells_handler(State(app): State<AppState>) -> Json<CellsResponse> {
    let s = app.lock();
    Json(CellsResponse {
        width: s.universe.width(),
        height: s.universe.height(),
        data: base64::engine::general_purpose::STANDARD.encode(s.universe.as_bytes()),
    })
}

async fn frame_handler(
    State(app): State<AppState>,
    Query(q): Query<FrameQuery>,
) -> ApiResult<FrameResponse> {
    let scale = q.scale.unwrap_or(4).clamp(1, 32);
    let (rgba, width, height) = {
        let s = app.lock();
        let u = &s.universe;
        match render::raster_size(u, scale) {
            Some((w, h)) if w * h <= MAX_PIXELS => {}
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "{}x{} at scale {scale} exceeds {MAX_PIXELS} pixels",
                    u.width(),
                    u.height()
                )));
            }
        }
        render::render_rgba(u, scale)
            .ok_or_else(|| ApiError::Internal("frame size overflow".into()))?
    };
    if rgba.is_empty() {
        return Err(ApiError::BadRequest("board is empty".into()));
    }
    let data_url = encode_png(&rgba, width, height).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(FrameResponse {
        width,
        height,
        data_url,
    }))
}

fn router(app: AppState) -> Router {
    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/size", post(size_handler))
        .route("/api/tick", post(tick_handler))
        .route("/api/toggle", post(toggle_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/pattern", post(pattern_handler))
        .route("/api/paste", post(paste_handler))
        .route("/api/cells_from_pattern", post(cells_from_pattern_handler))
        .route("/api/render", get(render_handler))
        .route("/api/cells", get(cells_handler))
        .route("/api/frame", get(frame_handler))
        .layer(CorsLayer::permissive())
        .with_state(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = AppState::new(42);
    {
        let mut s = app.lock();
        let Session { universe, rng } = &mut *s;
        universe.reset(rng);
    }

    let addr: SocketAddr = match std::env::var("LIFEGRID_ADDR") {
        Ok(a) => a.parse().with_context(|| format!("bad LIFEGRID_ADDR {a:?}"))?,
        Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
    };
    info!("lifegrid server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router(app)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(width: usize, height: usize) -> AppState {
        let app = AppState::new(1);
        app.lock().universe.set_size(width, height);
        app
    }

    #[tokio::test]
    async fn test_size_then_state() {
        let app = app_with(4, 4);
        let Json(s) = size_handler(
            State(app.clone()),
            Json(SizeRequest {
                width: Some(10),
                height: None,
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!((s.width, s.height, s.population), (10, 4, 0));
        let Json(s) = state_handler(State(app)).await;
        assert_eq!(s.width, 10);
    }

    #[tokio::test]
    async fn test_size_rejects_huge_boards() {
        let app = app_with(4, 4);
        let res = size_handler(
            State(app),
            Json(SizeRequest {
                width: Some(1 << 20),
                height: Some(1 << 20),
            }),
        )
        .await;
        assert!(matches!(res, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_glider_pattern_then_ticks() {
        let app = app_with(12, 12);
        pattern_handler(
            State(app.clone()),
            Json(PatternRequest {
                name: "glider".into(),
                row: 2,
                col: 2,
            }),
        )
        .await
        .ok()
        .unwrap();
        let Json(s) = tick_handler(State(app.clone()), Some(Json(TickRequest { ticks: Some(4) })))
            .await
            .ok()
            .unwrap();
        assert_eq!((s.generation, s.population), (4, 5));
        let u = &app.lock().universe;
        for (r, c) in [(3, 4), (4, 5), (5, 3), (5, 4), (5, 5)] {
            assert!(u.is_alive(r, c), "({r}, {c})");
        }
    }

    #[tokio::test]
    async fn test_unknown_pattern_is_bad_request() {
        let app = app_with(8, 8);
        let res = pattern_handler(
            State(app),
            Json(PatternRequest {
                name: "nope".into(),
                row: 0,
                col: 0,
            }),
        )
        .await;
        assert!(matches!(res, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_toggle_out_of_range_is_bad_request() {
        let app = app_with(3, 3);
        let res = toggle_handler(State(app), Json(CellRequest { row: 3, col: 0 })).await;
        assert!(matches!(res, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_reset_with_seed_is_reproducible() {
        let a = app_with(16, 16);
        let b = app_with(16, 16);
        let req = || {
            Some(Json(ResetRequest {
                seed: Some(9),
                fill: None,
            }))
        };
        reset_handler(State(a.clone()), req()).await.ok().unwrap();
        reset_handler(State(b.clone()), req()).await.ok().unwrap();
        assert_eq!(a.lock().universe.cells(), b.lock().universe.cells());
    }

    #[tokio::test]
    async fn test_cells_from_pattern_and_raw_cells() {
        let app = app_with(4, 2);
        let Json(r) = cells_from_pattern_handler(
            State(app.clone()),
            Json(CellsFromPatternRequest {
                coords: vec![0, 1, 1, 3, 7],
                min: 0,
                max: 3,
                row_translate: 0,
                col_translate: 0,
                limit: 10,
            }),
        )
        .await;
        assert_eq!(r.stamped, 2);
        let Json(cells) = cells_handler(State(app.clone())).await;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cells.data)
            .unwrap();
        assert_eq!(bytes, vec![0, 1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(render_handler(State(app)).await, "◻◼◻◻\n◻◻◻◼");
    }

    #[tokio::test]
    async fn test_paste_rle() {
        let app = app_with(8, 8);
        let Json(r) = paste_handler(
            State(app.clone()),
            Json(PasteRequest {
                text: "x = 3, y = 1\n3o!".into(),
                row: -1,
                col: 6,
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(r.stamped, 3);
        let u = &app.lock().universe;
        assert!(u.is_alive(7, 6) && u.is_alive(7, 7) && u.is_alive(7, 0));
    }

    #[tokio::test]
    async fn test_frame_is_png_data_url() {
        let app = app_with(3, 2);
        let Json(f) = frame_handler(State(app), Query(FrameQuery { scale: Some(2) }))
            .await
            .ok()
            .unwrap();
        assert_eq!((f.width, f.height), (6, 4));
        assert!(f.data_url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_frame_rejects_oversized_raster() {
        let app = app_with(4096, 4096);
        let r = frame_handler(State(app), Query(FrameQuery { scale: Some(32) })).await;
        assert!(matches!(r, Err(ApiError::BadRequest(_))));
    }
}
