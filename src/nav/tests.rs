//! Controller tests against a simulated forum thread.
//!
//! Time is paused: sleeps advance the clock deterministically, so request
//! latency, settle delay and animation timing are exact.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::task::LocalSet;
use tokio::time::{Instant, sleep, sleep_until};

use super::*;
use crate::config::{PageswapConfig, test_parse_config};
use crate::dom::{Document, NodeId, Selector};
use crate::host::{
    BehaviorActivator, FetchResponse, Host, NotificationKind, RecordingShell, ShellEvent,
    StaticFetcher, TimedAnimator,
};
use crate::window::{ClickEvent, Window};

const BASE: &str = "https://forum.test/threads/t.1/";
const LATENCY: Duration = Duration::from_millis(50);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Pager bar plus posts for page `n` of three.
fn page_markup(n: u32) -> String {
    let prev = if n > 1 {
        format!(r#"<a class="pageNav-jump--prev" href="/threads/t.1/page-{}">Prev</a>"#, n - 1)
    } else {
        String::new()
    };
    let next = if n < 3 {
        format!(r#"<a class="pageNav-jump--next" href="/threads/t.1/page-{}">Next</a>"#, n + 1)
    } else {
        String::new()
    };
    format!(
        r#"<div class="block-outer"><div class="pageNavWrapper">{prev}<a href="/threads/t.1/page-1">1</a><a href="/threads/t.1/page-2">2</a><a href="/threads/t.1/page-3">3</a><a href="/threads/t.1/page-Last">Last</a>{next}</div></div><div class="block-container"><div class="block-body"><p class="post">post {n}</p></div></div>"#
    )
}

fn page() -> String {
    format!(
        r#"<html><head><title>Thread</title><link rel="canonical" href="{BASE}"/><link rel="next" href="{BASE}page-2"/></head><body><div class="p-body" data-page-url="/threads/t.1/page-%page%">{}<div class="pageJump"><div class="pageNav-page--skip"><a>…</a></div><input class="js-pageJumpPage" value="3"/><button class="js-pageJumpGo">Go</button></div><div class="inlineModBar">bar</div><span class="js-inlineModTrigger">mod</span></div></body></html>"#,
        page_markup(1)
    )
}

const OVERLAY_PAGE: &str = r#"<html><head><title>Thread</title></head><body><div class="overlay"><div class="pageNavWrapper"><a href="/threads/t.1/page-2">2</a></div></div></body></html>"#;

fn page_response(n: u32) -> FetchResponse {
    FetchResponse::Json(json!({"html": {"content": page_markup(n), "title": "Thread"}}))
}

fn pages() -> StaticFetcher {
    let mut fetcher = StaticFetcher::new(LATENCY);
    fetcher.insert(BASE, page_response(1));
    for n in 1..=3 {
        fetcher.insert(format!("{BASE}page-{n}"), page_response(n));
    }
    fetcher
}

/// `pages()` with page 2 answering `response`.
fn page_two(response: Value) -> StaticFetcher {
    let mut fetcher = pages();
    fetcher.insert(format!("{BASE}page-2"), FetchResponse::Json(response));
    fetcher
}

struct Harness {
    controller: Controller,
    fetcher: Rc<StaticFetcher>,
    shell: Rc<RecordingShell>,
}

impl Harness {
    fn new(config: PageswapConfig) -> Self {
        Self::build(&page(), config, pages(), |host| host)
    }

    fn build(html: &str, config: PageswapConfig, fetcher: StaticFetcher, host: impl FnOnce(Host) -> Host) -> Self {
        let window = Window::load(html, BASE).unwrap();
        let fetcher = Rc::new(fetcher);
        let shell = Rc::new(RecordingShell::new());
        let host = host(Host::new(fetcher.clone(), shell.clone()));
        let controller = Controller::attach(window, host, config).expect("controller is active");
        Self {
            controller,
            fetcher,
            shell,
        }
    }

    fn window(&self) -> &Rc<Window> {
        self.controller.window()
    }

    fn find(&self, selector: &str) -> Option<NodeId> {
        self.window()
            .document()
            .query_selector(&Selector::parse(selector).unwrap())
    }

    fn find_all(&self, selector: &str) -> Vec<NodeId> {
        self.window()
            .document()
            .query_selector_all(&Selector::parse(selector).unwrap())
    }

    fn click(&self, selector: &str) -> bool {
        let node = self.find(selector).unwrap_or_else(|| panic!("no `{selector}`"));
        self.window().click(node)
    }

    fn texts(&self, selector: &str) -> Vec<String> {
        let doc = self.window().document();
        self.find_all(selector)
            .into_iter()
            .map(|n| doc.text_content(n).trim().to_string())
            .collect()
    }

    fn title(&self) -> String {
        self.window().document().title()
    }

    fn body(&self) -> String {
        let body = self.find(".p-body").unwrap();
        self.window().document().inner_html(body)
    }

    fn history_len(&self) -> usize {
        self.window().history().len()
    }
}

async fn settle() {
    sleep(ms(1000)).await;
}

// ============================================================================
// Click navigation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_click_navigates() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            assert!(h.click(".pageNav-jump--next"));
            settle().await;

            assert_eq!(h.texts(".post"), ["post 2"]);
            assert_eq!(h.find_all(".block-outer").len(), 1);
            assert_eq!(h.title(), "Thread - Page 2");

            let state = h.controller.state();
            assert_eq!(state.page, PageRef::Number(2));
            assert_eq!(state.href, format!("{BASE}page-2"));

            let history = h.window().history();
            assert_eq!(history.len(), 2);
            assert_eq!(history[1].url.as_str(), format!("{BASE}page-2"));
            assert_eq!(
                history[1].state,
                Some(json!({"page": 2, "href": format!("{BASE}page-2")}))
            );

            let seo = h.controller.seo();
            assert_eq!(seo.canonical, Some(format!("{BASE}page-2")));
            assert_eq!(seo.prev, Some(format!("{BASE}page-1")));
            assert_eq!(seo.next, Some(format!("{BASE}page-3")));

            let requests = h.fetcher.requests();
            assert_eq!(requests.len(), 1);
            assert!(requests[0].skip_default);
            assert_eq!(requests[0].form_data, None);

            let events = h.shell.events();
            assert_eq!(events.first(), Some(&ShellEvent::Notify(NotificationKind::Response)));
            assert!(events.contains(&ShellEvent::Notify(NotificationKind::Complete)));
            assert_eq!(h.shell.count(&ShellEvent::LayoutChange), 1);
            assert!(!h.controller.is_pending());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_repeated_clicks_single_fetch() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            let start = Instant::now();
            for _ in 0..5 {
                assert!(h.click(".pageNav-jump--next"));
            }
            sleep(ms(10)).await;
            assert_eq!(h.fetcher.requests().len(), 1);

            let go = h.find(".js-pageJumpGo").unwrap();
            assert!(h.window().document().is_disabled(go));

            assert!(h.click("a[href=\"/threads/t.1/page-3\"]"));
            sleep(ms(10)).await;
            assert_eq!(h.fetcher.requests().len(), 1);

            // released at latency + settle delay
            sleep_until(start + ms(340)).await;
            assert!(h.controller.is_pending());
            sleep_until(start + ms(360)).await;
            assert!(!h.controller.is_pending());
            assert!(!h.window().document().is_disabled(go));

            // and accepts the next navigation
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(h.fetcher.requests().len(), 2);
            assert_eq!(h.texts(".post"), ["post 3"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_request_options_forwarded() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config(
                "[request]\nmethod = \"POST\"\n[request.form_data]\n_xfResponseType = \"json\"\n",
            );
            let h = Harness::new(config);
            h.click(".pageNav-jump--next");
            settle().await;

            let request = &h.fetcher.requests()[0];
            assert_eq!(request.method.to_string(), "POST");
            let form = request.form_data.as_ref().unwrap();
            assert_eq!(form.get("_xfResponseType").map(String::as_str), Some("json"));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_text_page_and_unresolvable_url() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            let last = h.find("a[href$=\"page-Last\"]").unwrap();
            let page = {
                let doc = h.window().document();
                let next = Selector::parse(".pageNav-jump--next").unwrap();
                infer_page(&doc, last, &PageRef::Number(1), Some(&next), None)
            };
            assert_eq!(page, PageRef::Text("Last".into()));
            let template = h.controller.base_url().unwrap();
            assert_eq!(build_url(template, "%page%", &page), "/threads/t.1/page-Last");

            let before = h.body();
            h.window().click(last);
            settle().await;

            // nothing serves that URL: logged, released, untouched
            assert_eq!(h.fetcher.requests()[0].url, format!("{BASE}page-Last"));
            assert_eq!(h.body(), before);
            assert!(h.shell.alerts().is_empty());
            assert_eq!(h.history_len(), 1);
            assert!(!h.controller.is_pending());
        })
        .await;
}

// ============================================================================
// Response branches
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_exception_alerts_without_mutation() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"exception": "Boom"}));
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);
            let before = h.body();
            let start = Instant::now();

            h.click(".pageNav-jump--next");
            sleep_until(start + ms(100)).await;
            assert_eq!(h.shell.alerts(), ["Boom"]);
            assert!(h.controller.is_pending());

            sleep_until(start + ms(360)).await;
            assert!(!h.controller.is_pending());
            assert_eq!(h.body(), before);
            assert_eq!(h.title(), "Thread");
            assert_eq!(h.history_len(), 1);
            assert_eq!(h.controller.state().page, PageRef::Number(1));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_invalid_responses_alert() {
    LocalSet::new()
        .run_until(async {
            let mut fetcher = pages();
            fetcher.insert(format!("{BASE}page-2"), FetchResponse::Text("<html>oops".into()));
            fetcher.insert(format!("{BASE}page-3"), FetchResponse::Json(json!(["not", "an", "object"])));
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);

            h.click(".pageNav-jump--next");
            settle().await;
            h.click("a[href=\"/threads/t.1/page-3\"]");
            settle().await;

            assert_eq!(h.shell.alerts(), ["Response was not JSON.", "Response was not JSON."]);
            assert_eq!(h.shell.count(&ShellEvent::Notify(NotificationKind::Complete)), 0);
            assert_eq!(h.texts(".post"), ["post 1"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_response_notification_prevented() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            h.shell.prevent(NotificationKind::Response);
            h.click(".pageNav-jump--next");
            settle().await;

            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.shell.events(), [ShellEvent::Notify(NotificationKind::Response)]);
            assert!(!h.controller.is_pending());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_error_html_overlay() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"errorHtml": "<div class=\"blockMessage\">No permission</div>"}));
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);
            h.click(".pageNav-jump--next");
            settle().await;

            assert_eq!(h.texts(".overlay .overlay-title"), ["Oops! We ran into some problems."]);
            assert_eq!(h.texts(".overlay-content .blockMessage"), ["No permission"]);
            assert!(
                h.shell
                    .events()
                    .contains(&ShellEvent::Notify(NotificationKind::Error))
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_error_notification_prevented() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"errorHtml": {"content": "<p>x</p>", "h1": "Denied"}}));
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);
            h.shell.prevent(NotificationKind::Error);
            h.click(".pageNav-jump--next");
            settle().await;

            assert!(h.find(".overlay").is_none());
            assert!(
                h.shell
                    .events()
                    .contains(&ShellEvent::Notify(NotificationKind::Complete))
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_field_errors_alert() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"errors": ["Title required", "Too short"]}));
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(h.shell.alerts(), ["Title required\nToo short"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_releases_gate() {
    LocalSet::new()
        .run_until(async {
            let fetcher = pages().fail(format!("{BASE}page-2"), "connection reset");
            let h = Harness::build(&page(), PageswapConfig::default(), fetcher, |host| host);
            h.click(".pageNav-jump--next");
            settle().await;

            assert!(!h.controller.is_pending());
            assert!(h.shell.events().is_empty());
            let go = h.find(".js-pageJumpGo").unwrap();
            assert!(!h.window().document().is_disabled(go));
        })
        .await;
}

// ============================================================================
// Redirect and flash
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_redirect_followed() {
    LocalSet::new()
        .run_until(async {
            let response = json!({"redirect": "https://forum.test/threads/t.2/", "message": "Moved"});
            let h = Harness::build(&page(), PageswapConfig::default(), page_two(response.clone()), |host| host);
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(h.shell.count(&ShellEvent::Flash("Moved".into())), 0);
            assert_eq!(
                h.shell.count(&ShellEvent::Redirect("https://forum.test/threads/t.2/".into())),
                1
            );

            let config = test_parse_config("[request]\nforce_flash_message = true\n");
            let h = Harness::build(&page(), config, page_two(response), |host| host);
            h.click(".pageNav-jump--next");
            settle().await;
            let events = h.shell.events();
            let flash = events.iter().position(|e| *e == ShellEvent::Flash("Moved".into()));
            let redirect = events.iter().position(|e| matches!(e, ShellEvent::Redirect(_)));
            assert!(flash.unwrap() < redirect.unwrap());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_redirect_disabled_falls_through() {
    LocalSet::new()
        .run_until(async {
            let mut response = json!({"redirect": "https://forum.test/elsewhere"});
            response["html"] = json!({"content": page_markup(2), "title": "Thread"});
            let config = test_parse_config("[request]\nredirect = false\n");
            let h = Harness::build(&page(), config, page_two(response), |host| host);
            h.click(".pageNav-jump--next");
            settle().await;

            assert!(!h.shell.events().iter().any(|e| matches!(e, ShellEvent::Redirect(_))));
            assert_eq!(h.texts(".post"), ["post 2"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_redirect_inside_overlay_skipped() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"redirect": "https://forum.test/x", "message": "Saved"}));
            let config = test_parse_config("[request]\nskip_overlay_redirect = true\n");
            let h = Harness::build(OVERLAY_PAGE, config, fetcher, |host| host);
            let overlay = h.find(".overlay").unwrap();
            h.click(".pageNavWrapper a");
            settle().await;

            assert_eq!(h.shell.count(&ShellEvent::Flash("Saved".into())), 1);
            assert!(!h.shell.events().iter().any(|e| matches!(e, ShellEvent::Redirect(_))));
            assert!(h.window().document().is_hidden(overlay));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_message_flashes_and_closes_overlay() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({"message": "Thread watched."}));
            let h = Harness::build(OVERLAY_PAGE, PageswapConfig::default(), fetcher, |host| host);
            let overlay = h.find(".overlay").unwrap();
            h.click(".pageNavWrapper a");
            settle().await;

            assert_eq!(h.shell.count(&ShellEvent::Flash("Thread watched.".into())), 1);
            assert!(h.window().document().is_hidden(overlay));
        })
        .await;
}

// ============================================================================
// Target resolution
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_unresolvable_selectors_fall_back_to_overlay() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config("[swap]\nreplace = \".nope with .nothing\"\n");
            let h = Harness::new(config);
            h.click(".pageNav-jump--next");
            settle().await;

            assert_eq!(h.texts(".overlay > .overlay-title"), ["Thread"]);
            assert_eq!(h.texts(".overlay-content .post"), ["post 2"]);
            assert_eq!(h.texts(".p-body .post"), ["post 1"]);
            assert_eq!(h.history_len(), 1);
            assert_eq!(h.title(), "Thread");
            assert_eq!(h.controller.state().page, PageRef::Number(1));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_origin_overlay_hidden_on_fallback() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config("[swap]\nreplace = \".nope\"\n");
            let h = Harness::build(OVERLAY_PAGE, config, pages(), |host| host);
            let origin = h.find(".overlay").unwrap();
            h.click(".pageNavWrapper a");
            settle().await;

            let overlays = h.find_all("body > .overlay");
            assert_eq!(overlays.len(), 2);
            assert!(h.window().document().is_hidden(origin));
            assert!(!h.window().document().is_hidden(overlays[1]));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_descendant_fallback() {
    LocalSet::new()
        .run_until(async {
            let fetcher = page_two(json!({
                "html": "<div class=\"wrapper\"><div class=\"block-container\"><div class=\"block-body\"><p class=\"post\">post 2</p></div></div></div>"
            }));
            let config = test_parse_config("[swap]\nreplace = \".block-outer with .block-container\"\n");
            let h = Harness::build(&page(), config, fetcher, |host| host);
            h.click(".pageNav-jump--next");
            settle().await;

            assert!(h.find(".block-outer").is_none());
            assert!(h.find(".wrapper").is_none());
            assert_eq!(h.texts(".post"), ["post 2", "post 1"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_self_target_replaces_clicked_link() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config(
                "[swap]\nreplace = \"self with .pageNav-jump--next\"\nanimate = \"\"\n",
            );
            let h = Harness::new(config);
            let old = h.find(".pageNav-jump--next").unwrap();
            let parent = h.window().document().parent(old);
            h.window().click(old);
            settle().await;

            let doc = h.window().document();
            let new = doc
                .query_selector(&Selector::parse(".pageNav-jump--next").unwrap())
                .unwrap();
            assert_ne!(new, old);
            assert!(!doc.is_connected(old));
            assert_eq!(doc.parent(new), parent);
            assert_eq!(doc.attr(new, "href"), Some("/threads/t.1/page-3"));
            drop(doc);

            assert_eq!(h.texts(".post"), ["post 1"]);
            assert!(h.window().has_click_listener(new));
            assert_eq!(h.history_len(), 2);
        })
        .await;
}

// ============================================================================
// Swap sequencing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fade_out_precedes_mutation() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::build(&page(), PageswapConfig::default(), pages(), |host| {
                host.with_animator(Rc::new(TimedAnimator { duration: ms(200) }))
            });
            let start = Instant::now();
            h.click(".pageNav-jump--next");

            // response at 50ms, fade-out until 250ms
            sleep_until(start + ms(150)).await;
            assert_eq!(h.texts(".post"), ["post 1"]);
            let body = h.find(".block-body").unwrap();
            assert!(!h.window().document().is_hidden(body));
            assert_eq!(h.window().document().style(body, "transition").as_deref(), Some("none"));

            sleep_until(start + ms(260)).await;
            assert_eq!(h.texts(".post"), ["post 2"]);
            assert_eq!(h.shell.count(&ShellEvent::LayoutChange), 0);

            sleep_until(start + ms(500)).await;
            assert_eq!(h.shell.count(&ShellEvent::LayoutChange), 1);
            let body = h.find(".block-body").unwrap();
            assert!(!h.window().document().is_hidden(body));
        })
        .await;
}

struct RecordingActivator {
    calls: RefCell<Vec<usize>>,
}

impl BehaviorActivator for RecordingActivator {
    fn activate(&self, doc: &mut Document, roots: &[NodeId]) {
        assert!(roots.iter().all(|root| doc.is_connected(*root)));
        self.calls.borrow_mut().push(roots.len());
    }
}

#[tokio::test(start_paused = true)]
async fn test_activation_and_rebinding() {
    LocalSet::new()
        .run_until(async {
            let activator = Rc::new(RecordingActivator {
                calls: RefCell::new(Vec::new()),
            });
            let hook = activator.clone();
            let h = Harness::build(&page(), PageswapConfig::default(), pages(), |host| {
                host.with_activator(hook)
            });
            let old_links = h.find_all(".pageNavWrapper a");
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(*activator.calls.borrow(), [2]);

            // replaced pagers are released along with their listeners
            for link in &old_links {
                assert!(!h.window().has_click_listener(*link));
                assert!(!h.window().document().is_connected(*link));
                assert!(h.window().document().attr(*link, "href").is_none());
            }

            // every pager of the new content navigates
            for link in h.find_all(".pageNavWrapper a") {
                assert!(h.window().has_click_listener(link));
            }
            h.click(".pageNav-jump--prev");
            settle().await;
            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.controller.state().page, PageRef::Number(1));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_mod_bar_respawned() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            let bar = h.find(".inlineModBar").unwrap();
            let trigger = h.find(".js-inlineModTrigger").unwrap();
            let clicks = Rc::new(Cell::new(0));
            let counter = clicks.clone();
            h.window()
                .on_click(trigger, Rc::new(move |_: &ClickEvent| counter.set(counter.get() + 1)));

            let start = Instant::now();
            h.click(".pageNav-jump--next");
            sleep_until(start + ms(100)).await;
            assert_eq!(h.window().document().style(bar, "opacity").as_deref(), Some("0"));
            assert!(h.window().document().is_connected(bar));
            assert_eq!(clicks.get(), 0);

            sleep_until(start + ms(200)).await;
            assert!(!h.window().document().is_connected(bar));
            assert_eq!(clicks.get(), 1);
        })
        .await;
}

// ============================================================================
// Page jump
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_jump_clamps_and_pushes_first() {
    LocalSet::new()
        .run_until(async {
            let window_listener_hits = Rc::new(Cell::new(0));
            let h = Harness::new(PageswapConfig::default());

            // listeners bound before the deferred binding are replaced
            let go = h.find(".js-pageJumpGo").unwrap();
            let counter = window_listener_hits.clone();
            h.window()
                .on_click(go, Rc::new(move |_: &ClickEvent| counter.set(counter.get() + 1)));
            sleep(ms(150)).await;

            let skip_hits = Rc::new(Cell::new(0));
            let skip = h.find(".pageNav-page--skip a").unwrap();
            let counter = skip_hits.clone();
            h.window()
                .on_click(skip, Rc::new(move |_: &ClickEvent| counter.set(counter.get() + 1)));

            let field = h.find(".js-pageJumpPage").unwrap();
            h.window().document_mut().set_value(field, "-4");
            h.window().click(go);

            // history before the request
            assert_eq!(h.history_len(), 2);
            assert_eq!(h.window().location().as_str(), format!("{BASE}page-1"));
            assert_eq!(h.controller.state().page, PageRef::Number(1));
            assert_eq!(skip_hits.get(), 1);
            assert_eq!(window_listener_hits.get(), 0);
            assert!(h.fetcher.requests().is_empty());

            settle().await;
            assert_eq!(h.fetcher.requests()[0].url, format!("{BASE}page-1"));
            assert_eq!(h.title(), "Thread");
            // no second push once the response applies
            assert_eq!(h.history_len(), 2);

            h.window().document_mut().set_value(field, "3");
            h.window().click(go);
            settle().await;
            assert_eq!(h.texts(".post"), ["post 3"]);
            assert_eq!(h.title(), "Thread - Page 3");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_jump_not_bound_before_delay() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            h.click(".js-pageJumpGo");
            sleep(ms(10)).await;
            assert!(h.fetcher.requests().is_empty());
            assert_eq!(h.history_len(), 1);
        })
        .await;
}

// ============================================================================
// History
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_back_forward_refetches() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            h.click(".pageNav-jump--next");
            settle().await;
            let forward_body = h.body();
            let forward_title = h.title();
            let forward_seo = h.controller.seo();

            assert!(h.window().back());
            settle().await;
            assert_eq!(h.fetcher.requests()[1].url, BASE);
            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.title(), "Thread");
            assert_eq!(h.controller.state().page, PageRef::Number(1));
            assert_eq!(h.controller.seo().canonical.as_deref(), Some(BASE));
            assert_eq!(h.controller.seo().prev, None);

            assert!(h.window().forward());
            settle().await;
            assert_eq!(h.body(), forward_body);
            assert_eq!(h.title(), forward_title);
            assert_eq!(h.controller.seo(), forward_seo);
            assert_eq!(h.history_len(), 2);
            assert_eq!(h.fetcher.requests().len(), 3);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_back_forward_from_snapshots() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config("[history]\nsnapshot = true\n");
            let h = Harness::new(config);
            h.click(".pageNav-jump--next");
            settle().await;
            let forward_body = h.body();
            let forward_seo = h.controller.seo();

            let entry = HistoryEntry::from_value(h.window().history()[1].state.as_ref().unwrap()).unwrap();
            assert_eq!(entry.title.as_deref(), Some("Thread - Page 2"));
            assert!(entry.snapshot.unwrap().contains("post 2"));

            assert!(h.window().back());
            settle().await;
            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.title(), "Thread");

            assert!(h.window().forward());
            settle().await;
            assert_eq!(h.body(), forward_body);
            assert_eq!(h.title(), "Thread - Page 2");
            assert_eq!(h.controller.seo(), forward_seo);

            // restored without any request
            assert_eq!(h.fetcher.requests().len(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_popstate_for_in_flight_url_ignored() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            sleep(ms(150)).await;
            let field = h.find(".js-pageJumpPage").unwrap();
            h.window().document_mut().set_value(field, "2");
            h.click(".js-pageJumpGo");

            let entry = HistoryEntry::new(&NavigationState {
                page: PageRef::Number(3),
                href: format!("{BASE}page-3"),
            });
            h.window().push_state(entry.to_value(), &entry.href).unwrap();
            assert!(h.window().back());

            sleep(ms(10)).await;
            assert_eq!(h.fetcher.requests().len(), 1);
            settle().await;
            assert_eq!(h.texts(".post"), ["post 2"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_popstate_overrides_pending_request() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            h.click(".pageNav-jump--next");
            settle().await;

            let start = Instant::now();
            h.click(".pageNav-jump--next");
            sleep(ms(10)).await;
            assert!(h.window().back());
            sleep(ms(10)).await;
            assert_eq!(h.fetcher.requests().len(), 3);

            // the superseded request no longer releases the gate
            sleep_until(start + ms(355)).await;
            assert!(h.controller.is_pending());
            settle().await;
            assert!(!h.controller.is_pending());

            // and its page-3 response was dropped
            assert_eq!(h.window().location().as_str(), BASE);
            assert_eq!(h.window().history_index(), 0);
            assert_eq!(h.history_len(), 2);
            assert_eq!(h.texts(".post"), ["post 1"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_back_during_fade_wins() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::build(&page(), PageswapConfig::default(), pages(), |host| {
                host.with_animator(Rc::new(TimedAnimator { duration: ms(200) }))
            });
            let start = Instant::now();
            h.click(".pageNav-jump--next");

            // page 2 is committed at 50ms and fading out until 250ms
            sleep_until(start + ms(60)).await;
            assert_eq!(h.window().location().as_str(), format!("{BASE}page-2"));
            assert!(h.window().back());

            // the page-2 swap backs out instead of inserting
            sleep_until(start + ms(260)).await;
            assert_eq!(h.texts(".post"), ["post 1"]);
            let body = h.find(".block-body").unwrap();
            assert!(!h.window().document().is_hidden(body));

            settle().await;
            assert_eq!(h.window().location().as_str(), BASE);
            assert_eq!(h.controller.state().page, PageRef::Number(1));
            assert_eq!(h.controller.state().href, BASE);
            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.find_all(".block-outer").len(), 1);
            assert_eq!(h.title(), "Thread");
            assert_eq!(h.fetcher.requests().len(), 2);
            assert!(!h.controller.is_pending());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_back_drops_pending_click() {
    LocalSet::new()
        .run_until(async {
            let config = test_parse_config("[history]\nsnapshot = true\n");
            let h = Harness::new(config);
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(h.texts(".post"), ["post 2"]);

            h.click(".pageNav-jump--next");
            sleep(ms(10)).await;
            assert!(h.window().back());
            settle().await;

            assert_eq!(h.fetcher.requests().len(), 2);
            assert_eq!(h.window().location().as_str(), BASE);
            assert_eq!(h.window().history_index(), 0);
            assert_eq!(h.history_len(), 2);
            assert_eq!(h.texts(".post"), ["post 1"]);
            assert_eq!(h.title(), "Thread");
            assert_eq!(h.controller.state().page, PageRef::Number(1));

            // the gate was reopened, so the pager works again
            assert!(!h.controller.is_pending());
            h.click(".pageNav-jump--next");
            settle().await;
            assert_eq!(h.texts(".post"), ["post 2"]);
        })
        .await;
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_inert_configurations() {
    LocalSet::new()
        .run_until(async {
            for config in [
                "[swap]\nreplace = \"\"\n",
                "[pager]\npager = \"  \"\n",
                "[swap]\nreplace = \".a with [x\"\n",
                "[pager]\nnext_pager = \":hover\"\n",
            ] {
                let window = Window::load(&page(), BASE).unwrap();
                let link = window
                    .document()
                    .query_selector(&Selector::parse(".pageNav-jump--next").unwrap())
                    .unwrap();
                let host = Host::new(Rc::new(pages()), Rc::new(RecordingShell::new()));
                assert!(Controller::attach(window.clone(), host, test_parse_config(config)).is_none());
                assert!(!window.has_click_listener(link));
                assert!(!window.click(link));
            }
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_seo_stable_across_repeat_navigation() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(PageswapConfig::default());
            h.click("a[href=\"/threads/t.1/page-2\"]");
            settle().await;
            let head = h.window().document().head().unwrap();
            let first = h.window().document().outer_html(head);

            h.click("a[href=\"/threads/t.1/page-2\"]");
            settle().await;
            assert_eq!(h.window().document().outer_html(head), first);
            assert_eq!(h.find_all("head > link").len(), 3);
        })
        .await;
}
