//! Selectors compiled once per controller.

use crate::config::PageswapConfig;
use crate::config::section::non_empty;
use crate::dom::{DomError, Selector};

#[derive(Debug, Clone)]
pub struct Selectors {
    pub pager: Selector,
    pub next_pager: Option<Selector>,
    pub prev_pager: Option<Selector>,
    pub jump_pager: Option<Selector>,
    pub page_jump_submit: Option<Selector>,
    pub page_jump_field: Option<Selector>,
    pub filter: Option<Selector>,
    pub animate: Option<Selector>,
    pub overlay: Option<Selector>,
    pub mod_bar: Option<Selector>,
    pub mod_bar_trigger: Option<Selector>,
    pub disable_submit: Option<Selector>,
}

fn optional(value: &str) -> Result<Option<Selector>, DomError> {
    non_empty(value).map(Selector::parse).transpose()
}

impl Selectors {
    pub fn compile(config: &PageswapConfig) -> Result<Self, DomError> {
        let pager = &config.pager;
        let swap = &config.swap;
        Ok(Self {
            pager: Selector::parse(pager.pager.trim())?,
            next_pager: optional(&pager.next_pager)?,
            prev_pager: optional(&pager.prev_pager)?,
            jump_pager: optional(&pager.jump_pager)?,
            page_jump_submit: optional(&pager.page_jump_submit)?,
            page_jump_field: optional(&pager.page_jump_field)?,
            filter: optional(&swap.filter)?,
            animate: optional(&swap.animate)?,
            overlay: optional(&swap.overlay)?,
            mod_bar: optional(&swap.mod_bar)?,
            mod_bar_trigger: optional(&swap.mod_bar_trigger)?,
            disable_submit: optional(&config.request.disable_submit)?,
        })
    }
}
