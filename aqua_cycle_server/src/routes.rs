// HTTP surface: camera lifecycle, health, and the MJPEG stream.
//
// The stream is lazy and pull-driven: each item the consumer reads advances
// the camera by exactly one capture call and one full pipeline pass, so a
// slow client naturally throttles the whole loop. Frames are emitted strictly
// in capture order; the only recovery policy anywhere is "skip this frame."

use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::Stream;
use serde::Serialize;
use tracing::{info, warn};

use crate::state::{AppState, CameraSession};

const STREAM_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

#[derive(Serialize)]
pub struct CameraStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CameraStatus {
    fn of(status: &'static str) -> Self {
        Self { status, message: None }
    }
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    camera_on: bool,
}

#[derive(Serialize)]
pub struct StreamError {
    error: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "running",
        camera_on: state.camera_on.load(Ordering::SeqCst),
    })
}

/// Idempotent camera start. Failure to open a device is a structured error
/// response, not a server failure: the process keeps running and a later
/// start may succeed.
pub async fn camera_start(State(state): State<AppState>) -> Json<CameraStatus> {
    if state.camera_on.load(Ordering::SeqCst) {
        return Json(CameraStatus::of("already running"));
    }

    let config = state.config.clone();
    let sprites = state.sprites.clone();
    let opened = tokio::task::block_in_place(|| CameraSession::open(&config, sprites));

    match opened {
        Ok(session) => {
            *state.session.lock().await = Some(session);
            state.camera_on.store(true, Ordering::SeqCst);
            info!("camera started");
            Json(CameraStatus::of("started"))
        }
        Err(err) => {
            warn!(error = %err, "camera start failed");
            Json(CameraStatus {
                status: "error",
                message: Some("Camera not accessible".to_string()),
            })
        }
    }
}

/// Idempotent camera stop: clears the running flag and drops the session,
/// releasing the capture device.
pub async fn camera_stop(State(state): State<AppState>) -> Json<CameraStatus> {
    state.camera_on.store(false, Ordering::SeqCst);
    *state.session.lock().await = None;
    info!("camera stopped");
    Json(CameraStatus::of("stopped"))
}

/// The multipart JPEG stream, or a structured error while the camera is off.
pub async fn video(State(state): State<AppState>) -> Response {
    if !state.camera_on.load(Ordering::SeqCst) {
        return Json(StreamError { error: "Camera not started" }).into_response();
    }

    (
        [(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)],
        Body::from_stream(frame_stream(state)),
    )
        .into_response()
}

/// Unbounded, non-restartable frame sequence. The running flag is observed
/// at the top of each iteration, so a stop request lets the in-flight frame
/// complete before the stream ends.
fn frame_stream(state: AppState) -> impl Stream<Item = Result<Bytes, Infallible>> {
    async_stream::stream! {
        loop {
            if !state.camera_on.load(Ordering::SeqCst) {
                break;
            }
            let mut guard = state.session.lock().await;
            let Some(session) = guard.as_mut() else {
                break;
            };
            let jpeg = tokio::task::block_in_place(|| session.produce_jpeg(Instant::now()));
            drop(guard);

            match jpeg {
                Some(jpeg) => yield Ok(multipart_chunk(&jpeg)),
                // Transient capture or encode failure: skip, try again.
                None => continue,
            }
        }
    }
}

/// Wraps one encoded frame in its multipart boundary framing.
fn multipart_chunk(jpeg: &[u8]) -> Bytes {
    let mut chunk = Vec::with_capacity(jpeg.len() + 64);
    chunk.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
    chunk.extend_from_slice(jpeg);
    chunk.extend_from_slice(b"\r\n");
    Bytes::from(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_chunk_frames_the_payload() {
        let chunk = multipart_chunk(&[0xFF, 0xD8, 0xFF, 0xD9]);
        let text = chunk.as_ref();
        assert!(text.starts_with(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n"));
        assert!(text.ends_with(&[0xFF, 0xD9, b'\r', b'\n']));
    }

    #[test]
    fn status_payloads_serialize_without_empty_fields() {
        let started = serde_json::to_string(&CameraStatus::of("started")).unwrap();
        assert_eq!(started, r#"{"status":"started"}"#);

        let error = serde_json::to_string(&CameraStatus {
            status: "error",
            message: Some("Camera not accessible".into()),
        })
        .unwrap();
        assert!(error.contains(r#""message":"Camera not accessible""#));

        let health = serde_json::to_string(&Health { status: "running", camera_on: false }).unwrap();
        assert_eq!(health, r#"{"status":"running","camera_on":false}"#);
    }
}
