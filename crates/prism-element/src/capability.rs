//! Immersive display detection.
//!
//! Capability is a provider chosen once at startup: [`Unavailable`] when the
//! host cannot or may not present immersively, [`Available`] otherwise. The
//! provider resolves exactly once to the first immersive display or `None`.

use std::fmt;

use prism_engine::window::MonitorInfo;

use crate::settings::ElementSettings;

/// A display that can host an immersive presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmersiveDisplay {
    monitor: MonitorInfo,
}

impl ImmersiveDisplay {
    pub fn new(monitor: MonitorInfo) -> Self {
        Self { monitor }
    }

    pub fn name(&self) -> &str {
        self.monitor.name.as_deref().unwrap_or("unnamed display")
    }

    /// Physical top-left corner on the desktop.
    pub fn position(&self) -> (i32, i32) {
        self.monitor.position
    }

    /// Physical resolution.
    pub fn size(&self) -> (u32, u32) {
        self.monitor.size
    }

    pub fn refresh_millihertz(&self) -> Option<u32> {
        self.monitor.refresh_millihertz
    }

    pub fn monitor(&self) -> &MonitorInfo {
        &self.monitor
    }

    /// Whether `monitor` is this display.
    pub fn is_monitor(&self, monitor: &MonitorInfo) -> bool {
        self.monitor.same_display(monitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// A display name pattern that would match every display.
    BlankPattern,
    /// The display query itself failed.
    Query(String),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::BlankPattern => write!(f, "blank head-mounted display pattern"),
            CapabilityError::Query(msg) => write!(f, "display query failed: {msg}"),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Source of candidate immersive displays, in host order.
pub trait DisplayQuery {
    fn displays(&self) -> Result<Vec<ImmersiveDisplay>, CapabilityError>;
}

/// Resolves to the immersive display to present on, if any.
pub trait ImmersiveCapability {
    fn resolve(&self) -> Result<Option<ImmersiveDisplay>, CapabilityError>;
}

/// Host without immersive support.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl ImmersiveCapability for Unavailable {
    fn resolve(&self) -> Result<Option<ImmersiveDisplay>, CapabilityError> {
        Ok(None)
    }
}

/// Host with immersive support; picks the first display the query returns.
#[derive(Debug, Clone)]
pub struct Available<Q> {
    query: Q,
}

impl<Q: DisplayQuery> Available<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }
}

impl<Q: DisplayQuery> ImmersiveCapability for Available<Q> {
    fn resolve(&self) -> Result<Option<ImmersiveDisplay>, CapabilityError> {
        Ok(self.query.displays()?.into_iter().next())
    }
}

/// Connected monitors whose name looks like a head-mounted display.
#[derive(Debug, Clone)]
pub struct MonitorDisplays {
    monitors: Vec<MonitorInfo>,
    patterns: Vec<String>,
}

impl MonitorDisplays {
    pub fn new(monitors: Vec<MonitorInfo>, patterns: &[String]) -> Self {
        Self {
            monitors,
            patterns: patterns.iter().map(|p| p.trim().to_lowercase()).collect(),
        }
    }

    fn matches(&self, monitor: &MonitorInfo) -> bool {
        let Some(name) = monitor.name.as_deref() else {
            return false;
        };
        let name = name.to_lowercase();
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

impl DisplayQuery for MonitorDisplays {
    fn displays(&self) -> Result<Vec<ImmersiveDisplay>, CapabilityError> {
        if self.patterns.iter().any(|p| p.is_empty()) {
            return Err(CapabilityError::BlankPattern);
        }

        Ok(self
            .monitors
            .iter()
            .filter(|m| self.matches(m))
            .cloned()
            .map(ImmersiveDisplay::new)
            .collect())
    }
}

/// Picks the capability provider for this host.
///
/// Immersive support is off when disabled in settings or when the platform
/// cannot enumerate displays at all.
pub fn probe(settings: &ElementSettings, monitors: Vec<MonitorInfo>) -> Box<dyn ImmersiveCapability> {
    if !settings.immersive {
        log::debug!("immersive presentation disabled");
        return Box::new(Unavailable);
    }
    if monitors.is_empty() {
        log::debug!("platform reports no displays; immersive presentation unavailable");
        return Box::new(Unavailable);
    }
    Box::new(Available::new(MonitorDisplays::new(monitors, &settings.hmd_patterns)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, x: i32) -> MonitorInfo {
        MonitorInfo {
            name: Some(name.to_string()),
            position: (x, 0),
            size: (1920, 1080),
            scale_factor: 1.0,
            refresh_millihertz: Some(60_000),
        }
    }

    struct FixedQuery(Result<Vec<ImmersiveDisplay>, CapabilityError>);

    impl DisplayQuery for FixedQuery {
        fn displays(&self) -> Result<Vec<ImmersiveDisplay>, CapabilityError> {
            self.0.clone()
        }
    }

    fn settings() -> ElementSettings {
        ElementSettings::new(Vec::new())
    }

    #[test]
    fn unavailable_resolves_none() {
        assert_eq!(Unavailable.resolve(), Ok(None));
    }

    #[test]
    fn available_with_empty_list_resolves_none() {
        let cap = Available::new(FixedQuery(Ok(Vec::new())));
        assert_eq!(cap.resolve(), Ok(None));
    }

    #[test]
    fn available_resolves_first_display() {
        let first = ImmersiveDisplay::new(monitor("Rift CV1", 1920));
        let second = ImmersiveDisplay::new(monitor("Vive MV", 3840));
        let cap = Available::new(FixedQuery(Ok(vec![first.clone(), second])));
        assert_eq!(cap.resolve(), Ok(Some(first)));
    }

    #[test]
    fn query_failure_propagates() {
        let cap = Available::new(FixedQuery(Err(CapabilityError::Query("bus error".into()))));
        assert_eq!(cap.resolve(), Err(CapabilityError::Query("bus error".into())));
    }

    #[test]
    fn monitor_query_filters_by_pattern_case_insensitively() {
        let monitors = vec![
            monitor("DELL U2719D", 0),
            monitor("HTC VIVE", 2560),
            monitor("Valve Index HMD", 4720),
        ];
        let query = MonitorDisplays::new(monitors, &["vive".to_string(), "INDEX".to_string()]);
        let names: Vec<_> = query
            .displays()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["HTC VIVE", "Valve Index HMD"]);
    }

    #[test]
    fn unnamed_monitors_never_match() {
        let mut m = monitor("x", 0);
        m.name = None;
        let query = MonitorDisplays::new(vec![m], &["hmd".to_string()]);
        assert!(query.displays().unwrap().is_empty());
    }

    #[test]
    fn blank_pattern_is_a_query_error() {
        let query = MonitorDisplays::new(vec![monitor("Rift", 0)], &["  ".to_string()]);
        assert_eq!(query.displays(), Err(CapabilityError::BlankPattern));
    }

    #[test]
    fn probe_disabled_is_unavailable() {
        let s = settings().with_immersive(false);
        let cap = probe(&s, vec![monitor("Oculus Rift", 0)]);
        assert_eq!(cap.resolve(), Ok(None));
    }

    #[test]
    fn probe_without_monitors_is_unavailable() {
        let cap = probe(&settings(), Vec::new());
        assert_eq!(cap.resolve(), Ok(None));
    }

    #[test]
    fn probe_finds_hmd_among_desktop_monitors() {
        let cap = probe(&settings(), vec![monitor("LG 27GL850", 0), monitor("Oculus Rift", 2560)]);
        let display = cap.resolve().unwrap().unwrap();
        assert_eq!(display.name(), "Oculus Rift");
        assert_eq!(display.position(), (2560, 0));
        assert!(display.is_monitor(&monitor("Oculus Rift", 2560)));
        assert!(!display.is_monitor(&monitor("LG 27GL850", 0)));
    }
}
