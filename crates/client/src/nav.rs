//! Mobile navigation menu and current-page highlighting.

/// Viewport width above which the menu is always laid out inline and the
/// mobile menu is forced closed.
pub const DESKTOP_MIN_WIDTH: u32 = 768;

const LABEL_CLOSED: &str = "☰";
const LABEL_OPEN: &str = "✕";

/// Open/closed state of the mobile menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Menu button clicked.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// A click landed somewhere on the page. Clicks outside both the menu
    /// and its button close an open menu.
    pub fn on_click(&mut self, inside_menu: bool, on_button: bool) {
        if self.open && !inside_menu && !on_button {
            self.close();
        }
    }

    /// Viewport resized.
    pub fn on_resize(&mut self, width: u32) {
        if width > DESKTOP_MIN_WIDTH {
            self.close();
        }
    }

    /// Text of the menu button.
    pub fn button_label(&self) -> &'static str {
        if self.open {
            LABEL_OPEN
        } else {
            LABEL_CLOSED
        }
    }
}

/// Page name of a URL path: its last segment, `index.html` for the root.
pub fn current_page(path: &str) -> &str {
    match path.rsplit('/').next() {
        None | Some("") => "index.html",
        Some(name) => name,
    }
}

/// Index of the first link whose `href` points at the page at `path`.
pub fn active_link<S: AsRef<str>>(path: &str, hrefs: &[S]) -> Option<usize> {
    let page = current_page(path);
    hrefs.iter().position(|href| href.as_ref().contains(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_label() {
        let mut menu = NavMenu::new();
        assert_eq!(menu.button_label(), "☰");
        menu.toggle();
        assert!(menu.is_open());
        assert_eq!(menu.button_label(), "✕");
        menu.toggle();
        assert!(!menu.is_open());
    }

    #[test]
    fn test_outside_click_closes() {
        let mut menu = NavMenu::new();
        menu.toggle();
        menu.on_click(true, false);
        assert!(menu.is_open());
        menu.on_click(false, true);
        assert!(menu.is_open());
        menu.on_click(false, false);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_resize_closes_above_breakpoint() {
        let mut menu = NavMenu::new();
        menu.toggle();
        menu.on_resize(768);
        assert!(menu.is_open());
        menu.on_resize(1024);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_current_page() {
        assert_eq!(current_page("/"), "index.html");
        assert_eq!(current_page(""), "index.html");
        assert_eq!(current_page("/site/contact.html"), "contact.html");
    }

    #[test]
    fn test_active_link() {
        let links = ["index.html", "services.html", "contact.html"];
        assert_eq!(active_link("/contact.html", &links), Some(2));
        assert_eq!(active_link("/", &links), Some(0));
        assert_eq!(active_link("/missing.html", &links), None);
    }
}
