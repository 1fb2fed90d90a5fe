//! User-interaction signals that count as activity.

/// Interaction signal observed at the document level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Click,
    KeyPress,
    Scroll,
    PointerMove,
    TouchStart,
}

impl ActivityKind {
    /// Every signal the session manager subscribes to.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Click,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::PointerMove,
        ActivityKind::TouchStart,
    ];

    /// DOM event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::PointerMove => "mousemove",
            Self::TouchStart => "touchstart",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
