//! Workspace capture through KWin's ScreenShot2 D-Bus interface.

use crate::error::{Error, Result};
use crate::pixels::{to_rgba_image, PixelLayout};
use crate::FrameSource;
use image::RgbaImage;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::collections::HashMap;
use std::io::Read;
use tracing::trace;
use zbus::blocking::Connection;
use zvariant::{OwnedFd as ZOwnedFd, Value};

/// `QImage::Format_ARGB32_Premultiplied`, what KWin sends when it omits the format
const DEFAULT_QIMAGE_FORMAT: u32 = 6;

/// Screen capture via KWin (KDE Plasma 6.0+)
///
/// The calling binary must be allowed to use `org.kde.KWin.ScreenShot2`,
/// usually through `X-KDE-DBUS-Restricted-Interfaces` in its desktop file.
pub struct KwinCapture {
    conn: Connection,
}

impl KwinCapture {
    /// Connect to the session bus
    pub fn connect() -> Result<Self> {
        let conn = Connection::session().map_err(|e| {
            Error::ScreenshotFailed(format!("DBus connection failed - is KDE running?: {}", e))
        })?;
        Ok(Self { conn })
    }
}

impl FrameSource for KwinCapture {
    fn capture(&mut self) -> Result<RgbaImage> {
        // Create pipe for receiving image data
        let (read_fd, write_fd) = pipe2(OFlag::O_CLOEXEC)
            .map_err(|e| Error::ScreenshotFailed(format!("Failed to create pipe: {}", e)))?;

        let proxy = zbus::blocking::Proxy::new(
            &self.conn,
            "org.kde.KWin.ScreenShot2",
            "/org/kde/KWin/ScreenShot2",
            "org.kde.KWin.ScreenShot2",
        )
        .map_err(|e| Error::ScreenshotFailed(format!("KWin DBus interface not found: {}", e)))?;

        // Native resolution, so pixels line up with the template assets
        let mut options: HashMap<&str, Value> = HashMap::new();
        options.insert("native-resolution", Value::new(true));

        let response = proxy
            .call_method("CaptureWorkspace", &(options, ZOwnedFd::from(write_fd)))
            .map_err(|e| Error::ScreenshotFailed(format!("Screenshot capture failed: {}", e)))?;

        let body = response.body();
        let reply: HashMap<String, Value> = body
            .deserialize()
            .map_err(|e| Error::ScreenshotFailed(format!("Invalid response format: {}", e)))?;

        let width = extract_u32(&reply, "width")?;
        let height = extract_u32(&reply, "height")?;
        let stride = extract_u32(&reply, "stride")?;
        let format = extract_u32(&reply, "format").unwrap_or(DEFAULT_QIMAGE_FORMAT);
        let layout = PixelLayout::from_qimage_format(format)?;

        let expected_size = stride as usize * height as usize;
        let mut raw_data = vec![0u8; expected_size];
        let mut file = std::fs::File::from(read_fd);
        file.read_exact(&mut raw_data)
            .map_err(|e| Error::ScreenshotFailed(format!("Failed to read image data: {}", e)))?;

        trace!(width, height, stride, format, "Workspace captured");
        to_rgba_image(&raw_data, width, height, stride, layout)
    }
}

fn extract_u32(reply: &HashMap<String, Value>, key: &str) -> Result<u32> {
    let value = reply
        .get(key)
        .ok_or_else(|| Error::ScreenshotFailed(format!("Missing {} in reply", key)))?;

    value
        .downcast_ref::<u32>()
        .map_err(|_| Error::ScreenshotFailed(format!("Invalid type for {} in reply", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_u32_reads_values() {
        let mut reply = HashMap::new();
        reply.insert("width".to_string(), Value::new(1920u32));
        assert_eq!(extract_u32(&reply, "width").unwrap(), 1920);
    }

    #[test]
    fn extract_u32_reports_missing_keys() {
        let reply: HashMap<String, Value> = HashMap::new();
        let err = extract_u32(&reply, "stride").unwrap_err();
        assert!(err.to_string().contains("Missing stride"));
    }

    #[test]
    #[ignore = "requires KDE Plasma running"]
    fn capture_workspace() {
        let mut capture = KwinCapture::connect().expect("session bus");
        let frame = capture.capture().expect("capture");
        assert!(frame.width() > 0);
        assert!(frame.height() > 0);
    }
}
