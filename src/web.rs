use actix_web::{error, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::ScheduleSettings;
use crate::display::{format_slot_lines, Names};
use crate::schedule::{compute_metrics, generate_with_settings, Game, Group, Schedule, ScheduleMetrics, TimeSlot};

/// Last generated schedule together with the input it was built from
pub struct GeneratedSchedule {
    pub groups: Vec<Group>,
    pub games: Vec<Game>,
    pub schedule: Schedule,
    pub metrics: ScheduleMetrics,
}

// In-memory only; saving schedules is left to the storage service
pub struct AppState {
    pub generated: Mutex<Option<GeneratedSchedule>>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(admin_password: String) -> Self {
        Self {
            generated: Mutex::new(None),
            admin_password,
        }
    }

    fn lock_generated(&self) -> Result<MutexGuard<'_, Option<GeneratedSchedule>>> {
        self.generated
            .lock()
            .map_err(|_| error::ErrorInternalServerError("Schedule state is unavailable"))
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    groups: Vec<Group>,
    games: Vec<Game>,
    #[serde(default)]
    settings: ScheduleSettings,
}

/// A generated slot as produced by the generator, plus display lines
#[derive(Serialize)]
pub struct ScheduleSlotView<'a> {
    #[serde(flatten)]
    slot: &'a TimeSlot,
    parties: Vec<String>,
}

#[derive(Serialize)]
pub struct ScheduleResponse<'a> {
    slots: Vec<ScheduleSlotView<'a>>,
    metrics: ScheduleMetrics,
}

fn schedule_response(generated: &GeneratedSchedule) -> ScheduleResponse<'_> {
    let names = Names::new(&generated.groups, &generated.games);
    let slots = generated
        .schedule
        .slots
        .iter()
        .map(|slot| ScheduleSlotView {
            slot,
            parties: format_slot_lines(slot, &names),
        })
        .collect();
    ScheduleResponse {
        slots,
        metrics: generated.metrics,
    }
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    req.headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|p| p == state.admin_password)
}

// Admin login endpoint
async fn admin_login(req: web::Json<LoginRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Runs the generator and keeps the result
async fn generate(
    req: HttpRequest,
    body: web::Json<GenerateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let GenerateRequest { groups, games, settings } = body.into_inner();
    match generate_with_settings(&groups, &games, &settings) {
        Ok(schedule) => {
            let metrics = compute_metrics(&schedule, groups.len(), &games);
            info!(slots = schedule.slots.len(), optimal = metrics.is_optimal, "schedule generated via web");
            let generated = GeneratedSchedule { groups, games, schedule, metrics };
            let body = {
                let response = schedule_response(&generated);
                serde_json::json!({
                    "success": true,
                    "slots": response.slots,
                    "metrics": response.metrics,
                })
            };
            *state.lock_generated()? = Some(generated);

            Ok(HttpResponse::Ok().json(body))
        }
        Err(e) => {
            warn!(error = %e, "schedule generation rejected");
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
            })))
        }
    }
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.lock_generated()?.as_ref() {
        Some(generated) => Ok(HttpResponse::Ok().json(schedule_response(generated))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "Schedule not available"}))),
    }
}

async fn get_metrics(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.lock_generated()?.as_ref() {
        Some(generated) => Ok(HttpResponse::Ok().json(generated.metrics)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No data available"}))),
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(admin_login))
        .route("/api/generate", web::post().to(generate))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/metrics", web::get().to(get_metrics));
}

pub async fn start_server(port: u16, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(admin_password));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
