pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const FILE: &str = "📄";
    pub const PACKAGE: &str = "📦";
    pub const LINK: &str = "🔗";
    pub const GLOBE: &str = "🌍";
    pub const CYCLE: &str = "🔁";
    pub const ARROW: &str = "→";
}
