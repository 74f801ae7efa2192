//! `pageswap replay`: drive a controller through a scripted scenario.
//!
//! The scenario's page is loaded into a simulated window, canned responses
//! stand in for the network, and every step runs to completion before the
//! next one starts. The report shows where the page ended up.

mod report;
mod scenario;

pub use report::ReplayReport;
pub use scenario::{Scenario, ScenarioError, Step, StepError};

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tokio::task::LocalSet;
use tokio::time::sleep;

use crate::cli::ReplayArgs;
use crate::config::section::non_empty;
use crate::dom::{NodeId, Selector};
use crate::host::{Host, RecordingShell, TimedAnimator};
use crate::nav::{Controller, ReplaceSpec};
use crate::window::Window;
use crate::{debug, log};

/// Poll interval while waiting for a request to finish.
const POLL: Duration = Duration::from_millis(5);

/// Execute replay command
pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("cannot load scenario `{}`", args.scenario.display()))?;
    debug!("replay"; "{} step(s) against {}", scenario.steps.len(), scenario.url);

    let report = replay(scenario, args.full)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

/// Run `scenario` on a fresh single-threaded runtime.
pub fn replay(scenario: Scenario, full: bool) -> Result<ReplayReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    LocalSet::new().block_on(&runtime, drive(scenario, full))
}

async fn drive(scenario: Scenario, full: bool) -> Result<ReplayReport> {
    let window = Window::load(&scenario.page, &scenario.url)?;
    let fetcher = Rc::new(scenario.fetcher());
    let shell = Rc::new(RecordingShell::new());

    let mut host = Host::new(fetcher.clone(), shell.clone());
    if !scenario.fade.is_zero() {
        host = host.with_animator(Rc::new(TimedAnimator {
            duration: scenario.fade,
        }));
    }

    let config = scenario.config.clone();
    let controller = Controller::attach(Rc::clone(&window), host, scenario.config)
        .ok_or_else(|| anyhow!("controller stayed inert, nothing to replay"))?;
    let spec = ReplaceSpec::parse(&config.swap.replace)?;

    // pagers and the jump widget are usable once the jump binding has run
    let ready = config.timing.jump_bind() + Duration::from_millis(1);
    sleep(ready).await;

    // swap animations and the mod bar respawn outlive the request itself
    let tail = scenario.fade * 2 + config.timing.mod_bar() + Duration::from_millis(1);

    for (i, step) in scenario.steps.iter().enumerate() {
        debug!("replay"; "step {}: {}", i + 1, step);
        match step {
            Step::Click(selector) => click(&window, selector)?,
            Step::Jump(input) => {
                let (Some(field), Some(submit)) = (
                    non_empty(&config.pager.page_jump_field),
                    non_empty(&config.pager.page_jump_submit),
                ) else {
                    bail!("step {}: no page jump widget configured", i + 1);
                };
                let field = find(&window, field)?;
                window.document_mut().set_value(field, input);
                click(&window, submit)?;
            }
            Step::Back => {
                if !window.back() {
                    log!("replay"; "step {}: already at the first history entry", i + 1);
                }
            }
            Step::Forward => {
                if !window.forward() {
                    log!("replay"; "step {}: already at the last history entry", i + 1);
                }
            }
            Step::Wait(duration) => sleep(*duration).await,
        }

        while controller.is_pending() {
            sleep(POLL).await;
        }
        sleep(tail.max(ready)).await;
    }

    let doc = window.document();
    let state = controller.state();
    Ok(ReplayReport {
        title: doc.title(),
        location: window.location().to_string(),
        page: state.page.to_string(),
        history: ReplayReport::history_lines(&window),
        seo: controller.seo().into(),
        events: shell.events().iter().map(report::describe_event).collect(),
        requests: fetcher.requests().iter().map(report::describe_request).collect(),
        markup: report::region_markup(&doc, spec.as_ref(), full),
    })
}

fn find(window: &Window, selector: &str) -> Result<NodeId> {
    let parsed = Selector::parse(selector)?;
    window
        .document()
        .query_selector(&parsed)
        .ok_or_else(|| anyhow!("nothing matches `{selector}`"))
}

fn click(window: &Window, selector: &str) -> Result<()> {
    let node = find(window, selector)?;
    window.click(node);
    Ok(())
}
