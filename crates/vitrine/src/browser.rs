//! Chromium over the Chrome `DevTools` Protocol.
//!
//! [`CdpProvider`] launches one headless (or headed) Chromium per scenario
//! through chromiumoxide. Each [`CdpSession`] owns a private tokio runtime
//! and drives the async CDP client with `block_on`, so the synchronous
//! [`Session`] contract holds.
//!
//! Element handles live in a page-side registry: `find_elements` stores the
//! matched nodes on `window` and hands out `"<document token>:<index>"`
//! references. A reference taken before a navigation no longer resolves and
//! reports [`VitrineError::StaleElement`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::config::{Settings, WindowSize};
use crate::locator::{js_string, Selector};
use crate::result::{VitrineError, VitrineResult};
use crate::session::{BrowserKind, ElementRef, ElementState, ReadyState, Session, SessionProvider};

/// Page-side registry of handed-out element references
const REGISTRY: &str = "(window.__vitrineRefs = window.__vitrineRefs || [])";
/// Token identifying the current document
const DOCUMENT: &str =
    "(window.__vitrineDoc = window.__vitrineDoc || Math.random().toString(36).slice(2))";

/// Viewports narrower than this are emulated as mobile devices
const MOBILE_BREAKPOINT: u32 = 768;

/// Launches Chromium sessions
#[derive(Debug, Clone, Default)]
pub struct CdpProvider {
    headless: bool,
    chrome_path: Option<PathBuf>,
}

impl CdpProvider {
    #[must_use]
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            chrome_path: None,
        }
    }

    /// Use a specific Chrome/Chromium binary instead of auto-detection
    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }
}

impl SessionProvider for CdpProvider {
    fn create_session(&self, browser: BrowserKind, settings: &Settings) -> VitrineResult<Box<dyn Session>> {
        if browser != BrowserKind::Chrome {
            return Err(VitrineError::BrowserLaunch {
                message: format!("{browser} is not supported by the CDP backend"),
            });
        }
        let session = CdpSession::launch(settings, self.headless, self.chrome_path.as_ref())?;
        Ok(Box::new(session))
    }

    fn name(&self) -> &str {
        "cdp"
    }
}

/// One Chromium instance with a single page
pub struct CdpSession {
    runtime: Runtime,
    page: CdpPage,
    browser: Mutex<Option<CdpBrowser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession").finish_non_exhaustive()
    }
}

/// Envelope every element script returns
#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    stale: bool,
    #[serde(default)]
    value: serde_json::Value,
}

impl CdpSession {
    /// Launch Chromium and open a blank page
    pub fn launch(settings: &Settings, headless: bool, chrome_path: Option<&PathBuf>) -> VitrineResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let window = settings.window();
        let mut builder = CdpConfig::builder()
            .window_size(window.width, window.height)
            .args(
                settings
                    .browser_options(BrowserKind::Chrome, false)
                    .into_iter()
                    .filter(|arg| arg != "--no-sandbox"),
            )
            .no_sandbox();
        if !headless {
            builder = builder.with_head();
        }
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|message| VitrineError::BrowserLaunch { message })?;

        let (browser, mut handler) = runtime
            .block_on(CdpBrowser::launch(config))
            .map_err(|e| VitrineError::BrowserLaunch { message: e.to_string() })?;
        let handle = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| VitrineError::BrowserLaunch { message: e.to_string() })?;
        tracing::info!(headless, "chromium launched");

        Ok(Self {
            runtime,
            page,
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handle)),
        })
    }

    fn evaluate<T: DeserializeOwned>(&self, script: String) -> VitrineResult<T> {
        let result = self
            .runtime
            .block_on(self.page.evaluate(script))
            .map_err(|e| VitrineError::session(e.to_string()))?;
        Ok(result.into_value()?)
    }

    /// Run `body` with `el` bound to the referenced element
    fn with_element<T: DeserializeOwned>(&self, element: &ElementRef, body: &str) -> VitrineResult<T> {
        let reply: Reply = self.evaluate(element_script(element, body))?;
        if reply.stale {
            return Err(VitrineError::StaleElement {
                element: element.to_string(),
            });
        }
        Ok(serde_json::from_value(reply.value)?)
    }

    fn register(&self, query: &str) -> VitrineResult<Vec<ElementRef>> {
        let script = format!(
            "(() => {{ const reg = {REGISTRY}; const doc = {DOCUMENT}; \
             return ({query}).map(e => {{ let i = reg.indexOf(e); \
             if (i < 0) {{ i = reg.length; reg.push(e); }} return doc + ':' + i; }}); }})()"
        );
        let ids: Vec<String> = self.evaluate(script)?;
        Ok(ids.into_iter().map(ElementRef::new).collect())
    }

    fn press_enter(&self) -> VitrineResult<()> {
        for (kind, text) in [(DispatchKeyEventType::KeyDown, Some("\r")), (DispatchKeyEventType::KeyUp, None)] {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13);
            if let Some(text) = text {
                builder = builder.text(text);
            }
            let params = builder.build().map_err(VitrineError::session)?;
            self.runtime
                .block_on(self.page.execute(params))
                .map_err(|e| VitrineError::session(e.to_string()))?;
        }
        Ok(())
    }
}

/// Script resolving `element` and wrapping `body`'s result in a [`Reply`]
fn element_script(element: &ElementRef, body: &str) -> String {
    let (doc, index) = element.id().split_once(':').unwrap_or(("", ""));
    format!(
        "(() => {{ const reg = {REGISTRY}; \
         if ({DOCUMENT} !== {doc}) return {{ stale: true }}; \
         const el = reg[Number({index})]; \
         if (!el || !el.isConnected) return {{ stale: true }}; \
         const value = (() => {{ {body} }})(); \
         return {{ value: value === undefined ? null : value }}; }})()",
        doc = js_string(doc),
        index = js_string(index),
    )
}

/// Interactability check shared by click and typing
const REQUIRE_INTERACTABLE: &str = "const box = el.getBoundingClientRect(); \
     if (el.disabled || box.width === 0 || box.height === 0) return 'not interactable'; \
     el.scrollIntoView({ block: 'center' });";

impl Session for CdpSession {
    fn navigate(&self, url: &str) -> VitrineResult<()> {
        tracing::debug!(url, "goto");
        self.runtime
            .block_on(async {
                self.page.goto(url).await?;
                self.page.wait_for_navigation().await.map(|_| ())
            })
            .map_err(|e| VitrineError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn current_url(&self) -> VitrineResult<String> {
        let url = self
            .runtime
            .block_on(self.page.url())
            .map_err(|e| VitrineError::session(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    fn title(&self) -> VitrineResult<String> {
        let title = self
            .runtime
            .block_on(self.page.get_title())
            .map_err(|e| VitrineError::session(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    fn ready_state(&self) -> VitrineResult<ReadyState> {
        let state: String = self.evaluate("document.readyState".to_string())?;
        state.parse()
    }

    fn find_elements(&self, selector: &Selector) -> VitrineResult<Vec<ElementRef>> {
        self.register(&selector.to_query())
    }

    fn find_elements_within(&self, parent: &ElementRef, selector: &Selector) -> VitrineResult<Vec<ElementRef>> {
        let _: serde_json::Value = self.with_element(parent, "return null;")?;
        let (doc, index) = parent.id().split_once(':').unwrap_or(("", ""));
        let query = format!(
            "(() => {{ const p = {REGISTRY}[Number({index})]; \
             if ({DOCUMENT} !== {doc} || !p) return []; \
             return ({all}).filter(e => e !== p && p.contains(e)); }})()",
            index = js_string(index),
            doc = js_string(doc),
            all = selector.to_query(),
        );
        self.register(&query)
    }

    fn element_state(&self, element: &ElementRef) -> VitrineResult<ElementState> {
        self.with_element(
            element,
            "const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
             const displayed = s.display !== 'none' && s.visibility !== 'hidden'; \
             return { displayed, enabled: !el.disabled, \
             width: displayed ? Math.round(r.width) : 0, height: displayed ? Math.round(r.height) : 0 };",
        )
    }

    fn click(&self, element: &ElementRef) -> VitrineResult<()> {
        let refused: Option<String> = self.with_element(
            element,
            &format!("{REQUIRE_INTERACTABLE} el.click(); return null;"),
        )?;
        match refused {
            Some(message) => Err(VitrineError::NotInteractable {
                element: element.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    fn clear(&self, element: &ElementRef) -> VitrineResult<()> {
        self.with_element(
            element,
            "el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); return null;",
        )
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> VitrineResult<()> {
        let refused: Option<String> = self.with_element(
            element,
            &format!("{REQUIRE_INTERACTABLE} el.focus(); return null;"),
        )?;
        if let Some(message) = refused {
            return Err(VitrineError::NotInteractable {
                element: element.to_string(),
                message,
            });
        }
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                self.runtime
                    .block_on(self.page.execute(InsertTextParams::new(line)))
                    .map_err(|e| VitrineError::session(e.to_string()))?;
            }
            if lines.peek().is_some() {
                self.press_enter()?;
            }
        }
        Ok(())
    }

    fn text(&self, element: &ElementRef) -> VitrineResult<String> {
        self.with_element(element, "return (el.innerText || el.textContent || '');")
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> VitrineResult<Option<String>> {
        let name = js_string(name);
        self.with_element(
            element,
            &format!(
                "const name = {name}; \
                 if (name === 'checked') return el.checked ? 'true' : null; \
                 if (name === 'value' && 'value' in el) return String(el.value); \
                 return el.getAttribute(name);"
            ),
        )
    }

    fn select_option(&self, element: &ElementRef, visible_text: &str) -> VitrineResult<()> {
        let wanted = js_string(visible_text.trim());
        let found: bool = self.with_element(
            element,
            &format!(
                "const opt = Array.from(el.options || []).find(o => o.text.trim() === {wanted}); \
                 if (!opt) return false; el.value = opt.value; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;"
            ),
        )?;
        if found {
            Ok(())
        } else {
            Err(VitrineError::NoSuchElement {
                selector: format!("option {visible_text:?}"),
            })
        }
    }

    fn scroll_into_view(&self, element: &ElementRef) -> VitrineResult<()> {
        self.with_element(element, "el.scrollIntoView({ block: 'center' }); return null;")
    }

    fn hover(&self, element: &ElementRef) -> VitrineResult<()> {
        self.with_element(
            element,
            "for (const type of ['mouseover', 'mouseenter', 'mousemove']) { \
             el.dispatchEvent(new MouseEvent(type, { bubbles: true })); } return null;",
        )
    }

    fn refresh(&self) -> VitrineResult<()> {
        self.runtime
            .block_on(self.page.reload())
            .map(|_| ())
            .map_err(|e| VitrineError::session(e.to_string()))
    }

    fn back(&self) -> VitrineResult<()> {
        let _: serde_json::Value = self.evaluate("(() => { history.back(); return null; })()".to_string())?;
        self.runtime
            .block_on(self.page.wait_for_navigation())
            .map(|_| ())
            .map_err(|e| VitrineError::session(e.to_string()))
    }

    fn set_window_size(&self, size: WindowSize) -> VitrineResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(size.width))
            .height(i64::from(size.height))
            .device_scale_factor(1.0)
            .mobile(size.width < MOBILE_BREAKPOINT)
            .build()
            .map_err(VitrineError::session)?;
        self.runtime
            .block_on(self.page.execute(params))
            .map_err(|e| VitrineError::session(e.to_string()))?;
        tracing::debug!(width = size.width, height = size.height, "viewport resized");
        Ok(())
    }

    fn window_size(&self) -> VitrineResult<WindowSize> {
        self.evaluate("({ width: window.innerWidth, height: window.innerHeight })".to_string())
    }

    fn screenshot(&self) -> VitrineResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .runtime
            .block_on(self.page.execute(params))
            .map_err(|e| VitrineError::session(e.to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| VitrineError::session(format!("screenshot decode: {e}")))
    }

    fn quit(&self) -> VitrineResult<()> {
        let browser = self
            .browser
            .lock()
            .map_err(|_| VitrineError::session("browser lock poisoned"))?
            .take();
        let Some(mut browser) = browser else {
            return Ok(());
        };
        let closed = self.runtime.block_on(async {
            browser.close().await?;
            browser.wait().await?;
            Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
        });
        if let Ok(mut handler) = self.handler.lock() {
            if let Some(handle) = handler.take() {
                handle.abort();
            }
        }
        tracing::info!("chromium closed");
        closed.map_err(|e| VitrineError::session(e.to_string()))
    }
}
