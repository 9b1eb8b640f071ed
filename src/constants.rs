// DOM identifiers and overlay styling for the web frontend.

pub const OVERLAY_CANVAS_ID: &str = "ribbons-overlay";

// Full-viewport, always on top, never intercepting input
pub const OVERLAY_STYLE: [(&str, &str); 8] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100vw"),
    ("height", "100vh"),
    ("display", "block"),
    ("z-index", "9999"),
    ("pointer-events", "none"),
];
