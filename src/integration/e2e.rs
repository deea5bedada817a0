use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::{ServerConfig, ToolsConfig};
use crate::http::create_router;
use crate::state::AppState;
use crate::testing::{write_script, FAKE_FFMPEG_COPY, FAKE_YTDLP};

/// Serve the app on an ephemeral port backed by the fake tool scripts
async fn spawn_server(tools_dir: &Path, output_dir: &Path) -> SocketAddr {
    spawn_server_with(tools_dir, output_dir, FAKE_YTDLP).await
}

async fn spawn_server_with(tools_dir: &Path, output_dir: &Path, ytdlp: &str) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        output_dir: output_dir.to_path_buf(),
        tools: ToolsConfig {
            ffmpeg_path: write_script(tools_dir, "ffmpeg", FAKE_FFMPEG_COPY),
            ytdlp_path: write_script(tools_dir, "yt-dlp", ytdlp),
            ..Default::default()
        },
        ..Default::default()
    };

    let app = create_router(Arc::new(AppState::new(config)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_audio_round_trip() {
    let tools = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let addr = spawn_server(tools.path(), output.path()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/convert", addr))
        .json(&serde_json::json!({"url": "https://example.com/watch?v=1", "format": "mp3"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["filename"], "Fake Title.mp3");
    assert_eq!(json["title"], "Fake Title");

    // Raw download is gone, only the artifact remains
    let names: Vec<String> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Fake Title.mp3".to_string()]);

    let response = client
        .get(format!("http://{}/download/Fake%20Title.mp3", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    assert_eq!(&response.bytes().await.unwrap()[..], b"data");
}

#[tokio::test]
async fn test_video_round_trip() {
    let tools = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let addr = spawn_server(tools.path(), output.path()).await;

    let json: serde_json::Value = reqwest::Client::new()
        .post(format!("http://{}/convert", addr))
        .json(&serde_json::json!({"url": "https://example.com/watch?v=2", "format": "video"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["filename"], "Fake Title.mp4");
    // The scripted copy is not a real MP4, so the codec check can only warn
    assert_eq!(json["warnings"][0]["kind"], "audio_codec_unverified");
    assert!(output.path().join("Fake Title.mp4").is_file());
    assert!(!output.path().join("Fake Title.webm").exists());
}

#[tokio::test]
async fn test_version_reports_tools() {
    let tools = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let addr = spawn_server(tools.path(), output.path()).await;

    let json: serde_json::Value = reqwest::get(format!("http://{}/version", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["status"], "online");
    assert_eq!(json["jobs"]["running"], 0);
    assert_eq!(json["jobs"]["max"], 4);
    assert!(json["yt_dlp"].as_str().unwrap().ends_with("yt-dlp"));
}

#[tokio::test]
async fn test_unreachable_url_leaves_nothing_behind() {
    let tools = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let addr = spawn_server_with(
        tools.path(),
        output.path(),
        "echo 'ERROR: [generic] Unable to download webpage: connection refused' >&2\nexit 1\n",
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/convert", addr))
        .json(&serde_json::json!({"url": "http://unreachable.invalid/v", "format": "audio"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "error": "ERROR: [generic] Unable to download webpage: connection refused"
        })
    );
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}
