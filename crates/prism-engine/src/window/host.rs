use winit::event_loop::ActiveEventLoop;
use winit::monitor::MonitorHandle;

/// Snapshot of a connected display.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    /// Human-readable name reported by the platform, when there is one.
    pub name: Option<String>,
    /// Top-left corner in the desktop's physical coordinate space.
    pub position: (i32, i32),
    /// Physical resolution.
    pub size: (u32, u32),
    pub scale_factor: f64,
    pub refresh_millihertz: Option<u32>,
}

impl MonitorInfo {
    pub(crate) fn from_handle(handle: &MonitorHandle) -> Self {
        let position = handle.position();
        let size = handle.size();
        Self {
            name: handle.name(),
            position: (position.x, position.y),
            size: (size.width, size.height),
            scale_factor: handle.scale_factor(),
            refresh_millihertz: handle.refresh_rate_millihertz(),
        }
    }

    /// Resolution in logical pixels.
    pub fn logical_size(&self) -> (u32, u32) {
        let scale = if self.scale_factor > 0.0 { self.scale_factor } else { 1.0 };
        (
            (self.size.0 as f64 / scale).round() as u32,
            (self.size.1 as f64 / scale).round() as u32,
        )
    }

    /// Whether both snapshots describe the same physical display.
    ///
    /// Resolution and scale can change while a display stays connected, so
    /// only the name and desktop position are compared.
    pub fn same_display(&self, other: &MonitorInfo) -> bool {
        self.name == other.name && self.position == other.position
    }
}

/// Read-only view of the platform handed to `Element::connected`.
pub struct Host<'a> {
    event_loop: &'a ActiveEventLoop,
}

impl<'a> Host<'a> {
    pub(crate) fn new(event_loop: &'a ActiveEventLoop) -> Self {
        Self { event_loop }
    }

    /// All displays currently connected, in platform order.
    pub fn monitors(&self) -> Vec<MonitorInfo> {
        self.event_loop
            .available_monitors()
            .map(|m| MonitorInfo::from_handle(&m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, pos: (i32, i32), size: (u32, u32), scale: f64) -> MonitorInfo {
        MonitorInfo {
            name: Some(name.to_string()),
            position: pos,
            size,
            scale_factor: scale,
            refresh_millihertz: Some(90_000),
        }
    }

    #[test]
    fn logical_size_divides_by_scale() {
        let m = monitor("HMD", (0, 0), (2880, 1600), 2.0);
        assert_eq!(m.logical_size(), (1440, 800));
    }

    #[test]
    fn logical_size_tolerates_bogus_scale() {
        let m = monitor("HMD", (0, 0), (1920, 1080), 0.0);
        assert_eq!(m.logical_size(), (1920, 1080));
    }

    #[test]
    fn same_display_ignores_mode_changes() {
        let a = monitor("Vive MV", (1920, 0), (2160, 1200), 1.0);
        let mut b = a.clone();
        b.size = (1080, 1200);
        b.refresh_millihertz = None;
        assert!(a.same_display(&b));

        let c = monitor("Vive MV", (0, 0), (2160, 1200), 1.0);
        assert!(!a.same_display(&c));
    }
}
