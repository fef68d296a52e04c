use std::sync::Arc;
use tokio::sync::watch;

/// Which header controls are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub guest_nav: bool,
    pub logout: bool,
}

impl Header {
    pub fn for_auth(logged_in: bool) -> Self {
        Self {
            guest_nav: !logged_in,
            logout: logged_in,
        }
    }
}

/// What the user currently sees: the rendered view plus the header state.
#[derive(Clone)]
pub struct Screen {
    content: Arc<watch::Sender<String>>,
    header: Arc<watch::Sender<Header>>,
}

impl Default for Screen {
    fn default() -> Self {
        let (content, _) = watch::channel(String::new());
        let (header, _) = watch::channel(Header::for_auth(false));
        Self {
            content: Arc::new(content),
            header: Arc::new(header),
        }
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, content: impl Into<String>) {
        self.content.send_replace(content.into());
    }

    pub fn render_loading(&self) {
        self.render("Loading...");
    }

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.content.subscribe()
    }

    pub fn set_header_for_auth(&self, logged_in: bool) {
        self.header.send_replace(Header::for_auth(logged_in));
    }

    pub fn header(&self) -> Header {
        *self.header.borrow()
    }
}
