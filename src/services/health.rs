use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::services::scheduler::TimerScheduler;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub timezone: String,
    pub pending_timers: usize,
    pub uptime_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub scheduler: TimerScheduler,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(scheduler: TimerScheduler) -> Self {
        let state = AppState {
            scheduler,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds() as u64;

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timezone: state.scheduler.timezone().name().to_string(),
        pending_timers: state.scheduler.pending_count().await,
        uptime_seconds: uptime,
    })
}

async fn readiness_check() -> Json<&'static str> {
    // Nothing external to wait on; once the router is up we can take traffic
    Json("ready")
}

async fn liveness_check() -> Json<&'static str> {
    // Simple liveness check - if this endpoint responds, the service is alive
    Json("alive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduler::{ReminderSink, TransportError};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Duration;
    use std::sync::Arc;
    use teloxide::types::{ChatId, UserId};

    struct NullSink;

    #[async_trait::async_trait]
    impl ReminderSink for NullSink {
        async fn deliver(&self, _chat_id: ChatId, _text: String) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn test_scheduler() -> TimerScheduler {
        TimerScheduler::new(Arc::new(NullSink), chrono_tz::Europe::Moscow)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let scheduler = test_scheduler();
        let fire_at = scheduler.now() + Duration::hours(1);
        scheduler
            .schedule_at(UserId(1), ChatId(1), "tester", "ping", fire_at)
            .await
            .expect("Failed to schedule test timer");

        let server = TestServer::new(HealthService::new(scheduler).router)
            .expect("Failed to create test server");
        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let health_response: HealthResponse = response.json();
        assert_eq!(health_response.status, "healthy");
        assert_eq!(health_response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health_response.timezone, "Europe/Moscow");
        assert_eq!(health_response.pending_timers, 1);
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let server = TestServer::new(HealthService::new(test_scheduler()).router)
            .expect("Failed to create test server");

        let response = server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let ready_response: String = response.json();
        assert_eq!(ready_response, "ready");
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let server = TestServer::new(HealthService::new(test_scheduler()).router)
            .expect("Failed to create test server");

        let response = server.get("/health/live").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let alive_response: String = response.json();
        assert_eq!(alive_response, "alive");
    }
}
