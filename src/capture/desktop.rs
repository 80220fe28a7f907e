use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    X11,
    Unknown,
}

impl std::fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayServer::Wayland => write!(f, "Wayland"),
            DisplayServer::X11 => write!(f, "X11"),
            DisplayServer::Unknown => write!(f, "Unknown"),
        }
    }
}

impl DisplayServer {
    pub fn detect() -> Self {
        detect_display_server(|name| env::var(name).ok())
    }

    /// Global keyboard listening needs an X server; Wayland compositors block it.
    pub fn supports_global_keys(&self) -> bool {
        *self == DisplayServer::X11
    }
}

fn detect_display_server(var: impl Fn(&str) -> Option<String>) -> DisplayServer {
    if let Some(session_type) = var("XDG_SESSION_TYPE") {
        match session_type.to_lowercase().as_str() {
            "wayland" => return DisplayServer::Wayland,
            "x11" => return DisplayServer::X11,
            _ => {}
        }
    }

    if var("WAYLAND_DISPLAY").is_some() {
        return DisplayServer::Wayland;
    }

    if var("DISPLAY").is_some() {
        return DisplayServer::X11;
    }

    DisplayServer::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_session_type_wins() {
        let server = detect_display_server(env_of(&[
            ("XDG_SESSION_TYPE", "X11"),
            ("WAYLAND_DISPLAY", "wayland-0"),
        ]));
        assert_eq!(server, DisplayServer::X11);
        assert!(server.supports_global_keys());
    }

    #[test]
    fn test_fallback_variables() {
        assert_eq!(
            detect_display_server(env_of(&[("WAYLAND_DISPLAY", "wayland-0")])),
            DisplayServer::Wayland
        );
        assert_eq!(
            detect_display_server(env_of(&[("XDG_SESSION_TYPE", "tty"), ("DISPLAY", ":0")])),
            DisplayServer::X11
        );
        assert_eq!(detect_display_server(env_of(&[])), DisplayServer::Unknown);
        assert!(!DisplayServer::Wayland.supports_global_keys());
    }
}
