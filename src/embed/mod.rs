//! Embedded page template and static assets.
//!
//! `codex.js` and `codex.css` are minified by `build.rs` into `OUT_DIR`;
//! the script's websocket port is injected when served.
//!
//! ```ignore
//! use embed::{CODEX_JS, LiveVars};
//!
//! let js = CODEX_JS.render(&LiveVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

/// Page skeleton; `<main>` receives one container per input document.
pub const PAGE_HTML: &str = include_str!("page.html");

pub const CODEX_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/codex.min.css"));

pub const CODEX_SVG: &str = include_str!("static/codex.svg");

/// Variables for codex.js.
pub struct LiveVars {
    pub ws_port: u16,
}

impl TemplateVars for LiveVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__CODEX_WS_PORT__", &self.ws_port.to_string())
    }
}

/// Client runtime: collapsing, search, live updates.
pub const CODEX_JS: Template<LiveVars> =
    Template::new(include_str!(concat!(env!("OUT_DIR"), "/codex.min.js")));
