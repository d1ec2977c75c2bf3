//! Capture a photo and a short clip from the mock camera and upload both.
//!
//! Point `SNAPVAULT_API_URL` at a running media backend (default
//! `http://localhost:8080/api`). Without one, uploads fail and the demo
//! shows the error status instead.

use snapvault::gallery::{format_uploaded_at, DELETE_FAILED_MESSAGE};
use snapvault::{
    format_file_size, init_logging, CaptureMode, Event, GlobalConfig, MockDeviceSource, SnapVault,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GlobalConfig::from_env()?;
    init_logging(&config)?;

    let snapvault = SnapVault::init_with(config)?;
    println!("Backend: {}", snapvault.client().base_url());

    let camera = snapvault
        .capture()
        .device(Arc::new(MockDeviceSource::new()))
        .on_upload_success(|info| {
            println!("Stored {} ({})", info.filename, format_file_size(info.size as u64))
        })
        .build()?;
    let mut events = camera.events();

    // Photo
    let snapshot = camera.start_camera().await;
    println!("Camera: {:?}", snapshot.state);
    let snapshot = camera.capture_photo().await;
    println!("{}", snapshot.status.message);
    let snapshot = camera.upload().await;
    println!("{:?}: {}", snapshot.status.kind, snapshot.status.message);

    // Video
    camera.set_mode(CaptureMode::Video).await;
    camera.start_camera().await;
    camera.start_recording().await;
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        camera.pump_recording();
    }
    let snapshot = camera.stop_recording().await;
    println!("{}", snapshot.status.message);
    if let Some(url) = &snapshot.preview_url {
        println!("Preview at {}", url);
    }
    let snapshot = camera.upload().await;
    println!("{:?}: {}", snapshot.status.kind, snapshot.status.message);

    camera.shutdown().await;
    while let Some(event) = events.try_next() {
        println!("Event: {}", event.event_type());
        if let Event::UploadFailed { message } = event {
            println!("  {}", message);
        }
    }

    // Gallery
    let mut gallery = snapvault.gallery();
    gallery.refresh().await;
    if let Some(error) = gallery.error() {
        println!("{}", error);
        return Ok(());
    }
    for file in gallery.files() {
        println!(
            "#{} {} {} {}",
            file.id,
            file.original_file_name,
            format_file_size(file.file_size),
            format_uploaded_at(&file.uploaded_at)
        );
    }
    if let Some(oldest) = gallery.files().last().map(|f| f.id) {
        match gallery.delete(oldest).await {
            Ok(true) => println!("Deleted #{}", oldest),
            _ => println!("{}", DELETE_FAILED_MESSAGE),
        }
    }

    Ok(())
}
